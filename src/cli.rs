use clap::{Parser, Subcommand};
use sqlx::migrate::Migrator;
use sqlx::PgPool;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "kasir-core")]
#[command(about = "Kasir Core - point-of-sale backend and payment webhook relay", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    let migrator = Migrator::new(std::path::Path::new("./migrations")).await?;
    migrator.run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");
    config.validate()?;

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Database URL: {}", mask_password(&config.database_url));
    println!("  Database Timezone: {}", config.database_timezone);
    println!("  Webhook Tolerance: {}s", config.webhook.tolerance_secs);
    println!("  Deposit Secret: {}", redact(&config.webhook.secret_deposit));
    println!("  Payout Secret: {}", redact(&config.webhook.secret_payout));
    println!("  Merchant Callback URL: {}", config.merchant_callback_url);

    println!("✓ Configuration is valid");
    Ok(())
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "(not set)"
    } else {
        "****"
    }
}

fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if let Some(slash_pos) = url[..colon_pos].rfind("//") {
                let prefix = &url[..slash_pos + 2];
                let user = &url[slash_pos + 2..colon_pos];
                let suffix = &url[at_pos..];
                return format!("{}{}:****{}", prefix, user, suffix);
            }
        }
    }
    url.to_string()
}
