pub mod client;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use client::{AccountClient, ClientError};
use config::{resolve_base_url, ApiEnvironment, API_ENV_VAR, API_TOKEN_VAR};

#[derive(Parser)]
#[command(name = "aft")]
#[command(about = "AFT CLI - Submit AWS account lifecycle requests to the AFT Account API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, value_enum, help = "Environment to target (default: $AFT_API_ENV, else dev)")]
    pub env: Option<ApiEnvironment>,

    #[arg(long, global = true, help = "API base URL, overrides --env")]
    pub url: Option<String>,

    #[arg(long, global = true, env = API_TOKEN_VAR, hide_env_values = true, help = "Bearer token")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create a new AWS account")]
    Create {
        #[arg(long, help = "Path to JSON file with account request data")]
        input: PathBuf,
    },

    #[command(about = "Update an existing AWS account")]
    Update {
        #[arg(help = "Name of the account to update")]
        account_name: String,
        #[arg(long, help = "Path to JSON file with account request data")]
        input: PathBuf,
    },

    #[command(about = "Delete an AWS account")]
    Delete {
        #[arg(help = "Name of the account to delete")]
        account_name: String,
    },

    #[command(about = "Move an account to a higher tier")]
    Upgrade {
        account_name: String,
        #[arg(long, help = "Target tier")]
        tier: String,
    },

    #[command(about = "Move an account to a lower tier")]
    Downgrade {
        account_name: String,
        #[arg(long, help = "Target tier")]
        tier: String,
    },

    #[command(about = "Enable an option on an account")]
    AddOption {
        account_name: String,
        option_name: String,
        #[arg(long, help = "Path to JSON file with the option configuration")]
        config: Option<PathBuf>,
    },

    #[command(about = "Disable an option on an account")]
    RemoveOption {
        account_name: String,
        option_name: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Execute one command. Returns the process exit code.
pub async fn run(cli: Cli) -> anyhow::Result<i32> {
    let output_format = OutputFormat::from_cli(&cli);
    let env_var = std::env::var(API_ENV_VAR).ok();
    let base_url = resolve_base_url(cli.url.as_deref(), cli.env, env_var.as_deref())?;
    let client = AccountClient::new(base_url, cli.token)?;
    tracing::info!("Using AFT API at {}", client.base_url());

    let result = match cli.command {
        Commands::Create { input } => {
            let account = utils::load_json_file(&input)?;
            client.create_account(&account).await
        }
        Commands::Update { account_name, input } => {
            let account = utils::load_json_file(&input)?;
            client.update_account(&account_name, &account).await
        }
        Commands::Delete { account_name } => client.delete_account(&account_name).await,
        Commands::Upgrade { account_name, tier } => client.upgrade_account(&account_name, &tier).await,
        Commands::Downgrade { account_name, tier } => client.downgrade_account(&account_name, &tier).await,
        Commands::AddOption {
            account_name,
            option_name,
            config,
        } => {
            let option_config = config.as_deref().map(utils::load_json_file).transpose()?;
            client
                .add_option(&account_name, &option_name, option_config.as_ref())
                .await
        }
        Commands::RemoveOption {
            account_name,
            option_name,
        } => client.remove_option(&account_name, &option_name).await,
    };

    match result {
        Ok(response) => {
            utils::output_success(&output_format, &response)?;
            Ok(0)
        }
        Err(ClientError::Api { status, message }) => {
            utils::output_error(&output_format, &message, Some(status.as_u16()))?;
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
