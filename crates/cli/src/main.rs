use clap::{CommandFactory, Parser, Subcommand};

use beauty_agent_cli::api_client::ApiClient;
use beauty_agent_cli::{completions, display, interactive};

#[derive(Parser)]
#[command(name = "beauty")]
#[command(about = "Beauty concierge CLI: chat client and reviewer console")]
struct Cli {
    /// API server URL
    #[arg(long, default_value = "http://localhost:8080", env = "BEAUTY_SERVER_URL")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one chat message
    Chat {
        message: String,

        /// Continue an existing conversation
        #[arg(long)]
        conversation_id: Option<String>,
    },
    /// Interactive reviewer console for the approval queue
    Review {
        /// Reviewer identifier recorded on decisions
        #[arg(long = "as", default_value = "human")]
        reviewer: String,
    },
    /// List pending approval requests
    Pending,
    /// Show approval statistics
    Stats,
    /// Show the decision history
    History {
        /// Most recent N entries
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List installed approval policies
    Policies,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        completions::generate(shell, &mut Cli::command());
        return Ok(());
    }

    let client = ApiClient::new(&cli.server_url)?;

    match cli.command {
        Commands::Chat {
            message,
            conversation_id,
        } => {
            let response = client.chat(&message, conversation_id).await?;
            display::print_chat(&response);
        }
        Commands::Review { reviewer } => {
            interactive::run(&client, &reviewer).await?;
        }
        Commands::Pending => {
            let pending = client.pending().await?;
            if pending.count == 0 {
                println!("queue is empty");
            }
            for request in &pending.requests {
                display::print_request_summary(request);
            }
        }
        Commands::Stats => {
            let stats = client.statistics().await?;
            display::print_statistics(&stats);
        }
        Commands::History { limit } => {
            let history = client.history(limit).await?;
            for entry in &history.entries {
                display::print_history_entry(entry);
            }
        }
        Commands::Policies => {
            let policies = client.policies().await?;
            for policy in &policies.policies {
                display::print_policy(policy);
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
