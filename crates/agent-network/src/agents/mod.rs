//! The agents: supervisor, product knowledge, business search

pub mod business;
pub mod product;
pub mod supervisor;

pub use business::BusinessAgent;
pub use product::ProductAgent;
pub use supervisor::{ChatOutcome, SupervisorAgent};
