use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use nodekit::config::{NodeConfig, load_config_from_yaml};
use nodekit::nodes::echo::EchoNode;
use nodekit::runtime::context::ExecutionContext;
use nodekit::runtime::node::ModelNode;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, short)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node metadata document
    Metadata,

    /// Run the health check and print the response envelope
    Health,

    /// List registered capabilities
    Capabilities,

    /// Print the descriptor of one capability
    Info {
        /// Capability name
        name: String,
    },

    /// Execute a capability and print the response envelope
    Exec {
        /// Capability name
        #[arg(long, short)]
        capability: String,

        /// Input payload as JSON (defaults to an empty object)
        #[arg(long, short)]
        input: Option<String>,

        /// Request id (generated when omitted)
        #[arg(long)]
        request_id: Option<String>,
    },
}

fn build_node(config: &NodeConfig) -> Result<EchoNode> {
    let node = match &config.metadata_path {
        Some(path) => EchoNode::from_metadata_file(path)?,
        None => EchoNode::new()?,
    };
    Ok(node)
}

async fn run_command(node: &EchoNode, command: Commands) -> Result<()> {
    match command {
        Commands::Metadata => {
            println!("{}", serde_json::to_string_pretty(node.metadata())?);
        }
        Commands::Health => {
            let response = node.health_check().await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Capabilities => {
            for name in node.list_capabilities() {
                println!("{}", name);
            }
        }
        Commands::Info { name } => {
            let descriptor = node
                .get_capability_info(&name)
                .ok_or_else(|| anyhow!("Capability not found: {}", name))?;
            println!("{}", serde_json::to_string_pretty(descriptor)?);
        }
        Commands::Exec {
            capability,
            input,
            request_id,
        } => {
            let input_data = match input {
                Some(raw) => serde_json::from_str(&raw)
                    .map_err(|e| anyhow!("Invalid input JSON: {}", e))?,
                None => serde_json::json!({}),
            };

            let mut ctx = ExecutionContext::new(capability, input_data);
            if let Some(id) = request_id {
                ctx = ctx.with_request_id(id);
            }

            let response = node.execute(ctx).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from_yaml(path)?,
        None => NodeConfig::default(),
    };

    let node = build_node(&config)?;
    node.initialize().await?;
    info!("Node initialized");

    let result = run_command(&node, cli.command).await;

    // Cleanup runs even when the command failed.
    if let Err(e) = node.cleanup().await {
        error!(error = %e, "Cleanup failed");
    }

    result
}
