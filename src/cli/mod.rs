pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "resource-forum")]
#[command(about = "Community resources and forum web application")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the web server (default)")]
    Serve {
        #[arg(long, help = "Address to bind (overrides HOST)")]
        host: Option<String>,
        #[arg(long, help = "Port to bind (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Create an account directly in the database")]
    CreateUser {
        #[arg(help = "Username for the new account")]
        username: String,
        #[arg(long, help = "Password for the new account")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => commands::serve::handle(host, port).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::CreateUser { username, password } => {
            commands::user::create(username, password, output_format).await
        }
    }
}
