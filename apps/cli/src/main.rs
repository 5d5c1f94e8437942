use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use relaychat_core_sdk::{config::Config, llm, models::Role, server, store, telemetry};

/**
 * \brief CLI entry point. Configuration comes from the environment (OPENAI_API_KEY, RELAYCHAT_*).
 */
#[derive(Parser, Debug)]
#[command(name = "relaychat", version, about = "Minimal chat relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /**
     * \brief Start the HTTP service and serve the browser page.
     */
    Serve {
        #[arg(long, default_value = "127.0.0.1:5173")]
        addr: String,
    },

    /**
     * \brief Relay one prompt and print the completion. Nothing is stored.
     */
    Ask {
        #[arg(long)]
        prompt: String,
    },

    /**
     * \brief Relay one prompt and store both sides of the turn.
     */
    Chat {
        #[arg(long)]
        prompt: String,
    },

    /**
     * \brief Print the stored history, oldest first.
     */
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    telemetry::init(&config);

    match cli.command {
        Commands::Serve { addr } => {
            server::run(&addr, config).await?;
        }
        Commands::Ask { prompt } => {
            let reply = llm::complete(&config, &prompt)
                .await
                .context("relay failed")?;
            println!("{}", reply);
        }
        Commands::Chat { prompt } => {
            let turn = store::send_turn(&config, &prompt)
                .await
                .context("chat turn failed")?;
            println!("{}", turn.assistant.content);
        }
        Commands::History => {
            for message in store::load_history(&config) {
                let who = match message.role {
                    Role::User => "you",
                    Role::Assistant => "bot",
                };
                println!("[{}] {}: {}", message.created_at, who, message.content);
            }
        }
    }

    Ok(())
}
