//! CLI administration tool for link-analytics.
//!
//! Inspects the record file, builds reports offline and sends test events to
//! a running ingestion gateway.
//!
//! # Usage
//!
//! ```bash
//! # List stored destinations and clicks
//! cargo run --bin admin -- records
//!
//! # Build a report from the record file without touching the service
//! cargo run --bin admin -- report SourceIP TimeInterval
//!
//! # Send events to the gateway
//! cargo run --bin admin -- notify registration http://example.com abc123
//! cargo run --bin admin -- notify click http://example.com abc123 1.2.3.4
//! ```
//!
//! # Environment Variables
//!
//! - `RECORDS_PATH`: record file (default: `data/connections.json`)
//! - `INGEST_LISTEN`: gateway address (default: `127.0.0.1:6565`)

use link_analytics::domain::dimension::parse_dimensions;
use link_analytics::domain::entities::Record;
use link_analytics::domain::report::{ReportNode, build_report};
use link_analytics::domain::repositories::RecordRepository;
use link_analytics::infrastructure::persistence::JsonRecordRepository;
use link_analytics::ingest::GatewayClient;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// CLI tool for inspecting and feeding link-analytics.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// List stored destinations and clicks
    Records {
        /// Record file (overrides RECORDS_PATH)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Build a report from the record file and print it
    Report {
        /// Dimension names, outermost first: SourceIP, TimeInterval, Destination
        #[arg(required = true, num_args = 1..=3)]
        dimensions: Vec<String>,

        /// Record file (overrides RECORDS_PATH)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Print raw JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Send an event to the ingestion gateway
    Notify {
        #[command(subcommand)]
        event: NotifyEvent,

        /// Gateway address (overrides INGEST_LISTEN)
        #[arg(short, long, global = true)]
        gateway: Option<String>,

        /// Seconds to wait for the gateway reply
        #[arg(short, long, global = true, default_value_t = 5)]
        timeout: u64,
    },
}

/// Events accepted by the gateway.
#[derive(Subcommand)]
enum NotifyEvent {
    /// A short link was created for a destination
    Registration { url: String, code: String },

    /// A short link was followed
    Click {
        url: String,
        code: String,
        ip: IpAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Records { path } => list_records(records_path(path)).await?,
        Commands::Report {
            dimensions,
            path,
            json,
        } => print_report(records_path(path), &dimensions, json).await?,
        Commands::Notify {
            event,
            gateway,
            timeout,
        } => {
            let gateway = gateway
                .or_else(|| std::env::var("INGEST_LISTEN").ok())
                .unwrap_or_else(|| "127.0.0.1:6565".to_string());
            notify(&gateway, Duration::from_secs(timeout), event).await?
        }
    }

    Ok(())
}

fn records_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("RECORDS_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data/connections.json"))
}

async fn load_records(path: PathBuf) -> Result<Vec<Record>> {
    let repo = JsonRecordRepository::new(&path);
    repo.load()
        .await
        .with_context(|| format!("Failed to load records from {}", path.display()))
}

/// Lists destinations, then clicks, in stored order.
///
/// # Output Format
///
/// ```text
/// Destinations
///
///   ID    Registrations  Code      URL
///   ────────────────────────────────────────────────────────────
///   1     2              abc123    http://example.com
///
/// Clicks
///
///   ID    Parent  Source IP        Time
///   ────────────────────────────────────────────────────────────
///   2     1       1.2.3.4          2024-01-01 10:30
///   3     -       9.9.9.9          2024-01-01 10:31
/// ```
async fn list_records(path: PathBuf) -> Result<()> {
    let records = load_records(path).await?;

    println!("{}", "Destinations".bright_blue().bold());
    println!();
    println!(
        "  {:<5} {:<14} {:<9} {}",
        "ID".bright_white().bold(),
        "Registrations".bright_white().bold(),
        "Code".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    let parents: Vec<_> = records.iter().filter_map(Record::as_parent).collect();
    for parent in &parents {
        println!(
            "  {:<5} {:<14} {:<9} {}",
            parent.id.to_string().bright_black(),
            parent.registration_count,
            parent.short_url.cyan(),
            parent.url
        );
    }

    println!();
    println!("{}", "Clicks".bright_blue().bold());
    println!();
    println!(
        "  {:<5} {:<7} {:<16} {}",
        "ID".bright_white().bold(),
        "Parent".bright_white().bold(),
        "Source IP".bright_white().bold(),
        "Time".bright_white().bold()
    );
    println!("  {}", "─".repeat(60).bright_black());

    let clicks: Vec<_> = records.iter().filter_map(Record::as_child).collect();
    let mut orphans = 0;
    for click in &clicks {
        let parent = if click.is_orphan() {
            orphans += 1;
            "-".yellow()
        } else {
            click.parent_id.to_string().normal()
        };
        println!(
            "  {:<5} {:<7} {:<16} {}",
            click.id.to_string().bright_black(),
            parent,
            click.source_ip.cyan(),
            click.timestamp.bright_black()
        );
    }

    println!();
    println!(
        "  Destinations: {}  Clicks: {}  Orphaned: {}",
        parents.len().to_string().bright_white().bold(),
        clicks.len().to_string().bright_white().bold(),
        orphans.to_string().yellow()
    );
    println!();

    Ok(())
}

/// Builds a report over the record file and prints it as a tree.
async fn print_report(path: PathBuf, names: &[String], json: bool) -> Result<()> {
    let dimensions = parse_dimensions(names);
    let records = load_records(path).await?;
    let report = build_report(&dimensions, &records);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let labels: Vec<_> = dimensions.iter().map(|d| d.as_str()).collect();
    println!(
        "{} {}",
        "Report by".bright_blue().bold(),
        labels.join(" > ").bright_blue().bold()
    );
    println!();

    if report.is_empty() {
        println!("{}", "  No linked clicks recorded".yellow());
    } else {
        print_groups(report.groups(), 1);
    }

    println!();
    println!("  Total: {}", report.total().to_string().bright_white().bold());
    println!();

    Ok(())
}

fn print_groups(groups: &BTreeMap<String, ReportNode>, depth: usize) {
    for (key, node) in groups {
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            key.cyan(),
            node.sum.to_string().bright_white().bold()
        );
        print_groups(&node.groups, depth + 1);
    }
}

/// Sends one event and prints the record id the gateway assigned.
async fn notify(gateway: &str, timeout: Duration, event: NotifyEvent) -> Result<()> {
    let client = GatewayClient::new(gateway).with_timeout(timeout);

    let id = match event {
        NotifyEvent::Registration { url, code } => client
            .notify_registration(&url, &code)
            .await
            .with_context(|| format!("Gateway {} did not accept registration", gateway))?,
        NotifyEvent::Click { url, code, ip } => client
            .notify_click(&url, &code, ip)
            .await
            .with_context(|| format!("Gateway {} did not accept click", gateway))?,
    };

    println!(
        "{} record {}",
        "Accepted:".green().bold(),
        id.to_string().bright_white().bold()
    );

    Ok(())
}
