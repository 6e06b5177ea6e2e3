//! Agent-to-agent (A2A) messaging
//!
//! In-process message broker with capability-based discovery. Agents
//! register a profile and a handler; the broker routes request messages
//! to the target handler, records conversation history and keeps
//! delivery statistics. The HITL approval core does not depend on this
//! crate.

pub mod broker;
pub mod protocol;

pub use broker::{BrokerStatistics, MessageBroker, MessageHandler};
pub use protocol::{
    A2aError, A2aMessage, AgentCapability, AgentProfile, MessagePriority, MessageType,
};
