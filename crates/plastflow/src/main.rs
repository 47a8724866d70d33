// SPDX-FileCopyrightText: 2026 PlastFlow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PlastFlow SMS delivery service - operator command line.
//!
//! Sends notifications through the primary/secondary failover pipeline and
//! inspects message records and provider health.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use plastflow_config::{ConfigError, PlastflowConfig};
use plastflow_core::{MessageStore, PlastflowError, SmsProvider};
use plastflow_notify::{HealthTracker, SendOptions, SmsService};
use plastflow_storage::SqliteStore;
use plastflow_taqnyat::TaqnyatSms;
use plastflow_twilio::TwilioSms;

/// PlastFlow SMS delivery service.
#[derive(Parser, Debug)]
#[command(name = "plastflow", version, about, long_about = None)]
struct Cli {
    /// Path to an explicit config file (bypasses the XDG hierarchy).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a text message through the failover pipeline.
    Send {
        /// Destination phone number (E.164).
        to: String,
        /// Message body.
        message: String,
        /// User triggering the send.
        #[arg(long)]
        sent_by: Option<String>,
        /// Recipient display name.
        #[arg(long)]
        recipient_name: Option<String>,
        /// Linked sales order id.
        #[arg(long)]
        order_id: Option<String>,
        /// Linked production job order id.
        #[arg(long)]
        job_order_id: Option<String>,
        /// Linked customer id.
        #[arg(long)]
        customer_id: Option<String>,
        /// Message category (order_notification, job_order_update,
        /// status_update, custom).
        #[arg(long)]
        category: Option<String>,
        /// Priority tag (low, normal, high, urgent).
        #[arg(long)]
        priority: Option<String>,
    },
    /// Show provider health records.
    Health,
    /// Re-poll delivery status for a message.
    Status {
        /// Id of the message to check.
        message_id: String,
    },
    /// List recent messages, newest first.
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(errors) => {
            plastflow_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    plastflow_notify::register_metrics();

    if let Err(e) = run(cli.command, config).await {
        eprintln!("plastflow: {e}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<PlastflowConfig, Vec<ConfigError>> {
    match &cli.config {
        Some(path) => plastflow_config::load_and_validate_path(path),
        None => plastflow_config::load_and_validate(),
    }
}

fn init_tracing(config: &PlastflowConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(command: Commands, config: PlastflowConfig) -> Result<(), PlastflowError> {
    let store = Arc::new(SqliteStore::new(
        config.storage.clone(),
        config.health.policy(),
    ));
    store.initialize().await?;

    let primary: Arc<dyn SmsProvider> = Arc::new(TaqnyatSms::new(&config.taqnyat)?);
    let secondary: Arc<dyn SmsProvider> = Arc::new(TwilioSms::new(&config.twilio)?);
    let service = SmsService::new(
        primary,
        secondary,
        store.clone(),
        HealthTracker::new(store.clone()),
    );

    match command {
        Commands::Send {
            to,
            message,
            sent_by,
            recipient_name,
            order_id,
            job_order_id,
            customer_id,
            category,
            priority,
        } => {
            let options = SendOptions {
                sent_by,
                recipient_name,
                customer_id,
                order_id,
                job_order_id,
                category: parse_arg("category", category)?,
                priority: parse_arg("priority", priority)?,
            };
            let result = service.send_message(&to, &message, options).await?;
            println!("message {} -> {}", result.id, result.status);
            if let Some(provider) = &result.provider {
                println!("  provider: {provider}");
            }
            if let Some(provider_message_id) = &result.provider_message_id {
                println!("  provider message id: {provider_message_id}");
            }
            if let Some(detail) = &result.error_detail {
                println!("  detail: {detail}");
            }
        }
        Commands::Health => {
            let rows = service.health().all().await?;
            if rows.is_empty() {
                println!("no provider outcomes recorded yet");
            }
            for health in rows {
                println!(
                    "{}: {} ({} ok / {} failed, checked {})",
                    health.provider,
                    health.status,
                    health.success_count,
                    health.failure_count,
                    health.checked_at,
                );
                if let Some(last_error) = &health.last_error {
                    println!("  last error: {last_error}");
                }
            }
        }
        Commands::Status { message_id } => match service.check_message_status(&message_id).await? {
            Some(message) => {
                println!("message {} -> {}", message.id, message.status);
                if let Some(delivered_at) = &message.delivered_at {
                    println!("  delivered at: {delivered_at}");
                }
                if let Some(detail) = &message.error_detail {
                    println!("  detail: {detail}");
                }
            }
            None => println!("no message with id {message_id}"),
        },
        Commands::Recent { limit } => {
            for message in store.recent_messages(limit).await? {
                println!(
                    "{}  {}  {}  {}  {}",
                    message.sent_at,
                    message.id,
                    message.status,
                    message.recipient,
                    message.provider.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    store.close().await?;
    Ok(())
}

/// Parse an optional string flag into a strongly typed enum value.
fn parse_arg<T>(name: &str, value: Option<String>) -> Result<Option<T>, PlastflowError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| PlastflowError::Config(format!("invalid {name} `{v}`: {e}")))
        })
        .transpose()
}
