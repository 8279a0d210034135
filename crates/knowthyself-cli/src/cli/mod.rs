//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use knowthyself_core::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "knowthyself")]
#[command(version)]
#[command(about = "Gateway and terminal client for the KnowThyself backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Address to bind (overrides config)
        #[arg(long, value_name = "ADDR", env = "KNOWTHYSELF_GATEWAY_ADDR")]
        addr: Option<String>,
    },

    /// Interactive chat through the gateway
    Chat {
        /// Resume an existing thread by ID
        #[arg(long, value_name = "THREAD_ID")]
        thread: Option<String>,
    },

    /// Send a single message and print the assistant reply
    Send {
        /// The message to send
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Continue an existing thread by ID
        #[arg(long, value_name = "THREAD_ID")]
        thread: Option<String>,

        /// Print the thread ID after the reply
        #[arg(long)]
        show_thread: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // default to chat mode
    let command = cli.command.unwrap_or(Commands::Chat { thread: None });

    match command {
        Commands::Serve { addr } => {
            let config = Config::load().context("load config")?;
            commands::serve::run(addr.as_deref(), &config).await
        }
        Commands::Chat { thread } => {
            let config = Config::load().context("load config")?;
            commands::chat::run(thread.as_deref(), &config).await
        }
        Commands::Send {
            message,
            thread,
            show_thread,
        } => {
            let config = Config::load().context("load config")?;
            commands::send::run(&message, thread.as_deref(), show_thread, &config).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
