//! CLI administration tool for the stats service.
//!
//! Reads the hit store directly, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Totals over the whole store
//! cargo run --bin admin -- summary
//!
//! # Most viewed URIs in a window
//! cargo run --bin admin -- top --start "2025-06-01 00:00:00" --end "2025-06-30 23:59:59"
//!
//! # Unique visitors for selected URIs
//! cargo run --bin admin -- top --start "2025-06-01 00:00:00" --end "2025-06-30 23:59:59" \
//!     --uri /events/1 --uri /events/2 --unique
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string

use ewm_stats::domain::StatsQuery;
use ewm_stats::domain::repositories::HitRepository;
use ewm_stats::infrastructure::persistence::PgHitRepository;
use ewm_stats::utils::timestamp;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for inspecting the stats hit store.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Show store totals
    Summary,

    /// Show aggregated hit counts for a time window
    Top {
        /// Window start, "yyyy-MM-dd HH:mm:ss"
        #[arg(long, value_parser = parse_timestamp)]
        start: NaiveDateTime,

        /// Window end, "yyyy-MM-dd HH:mm:ss"
        #[arg(long, value_parser = parse_timestamp)]
        end: NaiveDateTime,

        /// Restrict to these URIs (repeatable)
        #[arg(long = "uri")]
        uris: Vec<String>,

        /// Count distinct IPs instead of raw hits
        #[arg(long)]
        unique: bool,

        /// Maximum rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Summary => handle_summary(&pool).await?,
        Commands::Top {
            start,
            end,
            uris,
            unique,
            limit,
        } => {
            let query = StatsQuery::new(start, end)
                .map_err(|e| anyhow::anyhow!("{}", e))?
                .with_uris(uris)
                .with_unique(unique);
            handle_top(&pool, query, limit).await?
        }
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, String> {
    timestamp::parse(value)
        .map_err(|e| format!("expected \"{}\": {}", timestamp::TIMESTAMP_FORMAT, e))
}

/// Displays store totals.
///
/// Shows:
/// - Total number of hits
/// - Number of distinct URIs and applications
/// - First and last recorded moment
async fn handle_summary(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Hit store summary".bright_blue().bold());
    println!();

    let hits: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM hits")
        .fetch_one(pool)
        .await?;

    let uris: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT uri) FROM hits")
        .fetch_one(pool)
        .await?;

    let apps: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT application) FROM hits")
        .fetch_one(pool)
        .await?;

    let (first, last): (Option<NaiveDateTime>, Option<NaiveDateTime>) =
        sqlx::query_as("SELECT MIN(moment), MAX(moment) FROM hits")
            .fetch_one(pool)
            .await?;

    println!("  Hits:          {}", hits.to_string().bright_green().bold());
    println!("  Distinct URIs: {}", uris.to_string().bright_green().bold());
    println!("  Applications:  {}", apps.to_string().bright_green().bold());

    if let (Some(first), Some(last)) = (first, last) {
        println!(
            "  Range:         {} .. {}",
            timestamp::format(&first).bright_white(),
            timestamp::format(&last).bright_white()
        );
    }
    println!();

    Ok(())
}

/// Prints the aggregate for `query`, most viewed first.
async fn handle_top(pool: &PgPool, query: StatsQuery, limit: usize) -> Result<()> {
    let repo = PgHitRepository::new(Arc::new(pool.clone()));

    let rows = repo
        .aggregate(&query)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let mode = if query.unique { "unique" } else { "total" };
    println!(
        "{} {} .. {} ({})",
        "📈 Top URIs".bright_blue().bold(),
        timestamp::format(&query.start),
        timestamp::format(&query.end),
        mode
    );
    println!();

    if rows.is_empty() {
        println!("{}", "  No hits in this window".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<20} {:<40} {:>10}",
        "APP".bold(),
        "URI".bold(),
        "HITS".bold()
    );
    for row in rows.iter().take(limit) {
        println!(
            "  {:<20} {:<40} {:>10}",
            row.application.cyan(),
            row.uri,
            row.hits.to_string().bright_green()
        );
    }

    if rows.len() > limit {
        println!(
            "{}",
            format!("  ... {} more", rows.len() - limit).bright_black()
        );
    }
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let table_size: String =
                sqlx::query_scalar("SELECT pg_size_pretty(pg_total_relation_size('hits'))")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  hits table: {}", table_size.bright_white());
            println!();
        }
    }

    Ok(())
}
