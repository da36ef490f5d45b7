//! Fieldpost CLI — submit and retrieve agent reports.
//!
//! Set FIELDPOST_REPORT_FOLDER for the local filesystem backend, or leave
//! it empty (or set it to EMAIL) for the remote object-store + email
//! backend. The full environment surface is documented on `Config`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use fieldpost_cli::init_tracing;
use fieldpost_services::{Config, ReportService, SearchCriteria, SubmitRequest};

#[derive(Parser)]
#[command(name = "fieldpost", about = "Agent report capture and retrieval")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a report
    Submit {
        /// Name of the submitting agent
        #[arg(long)]
        agent: String,
        /// Report title
        #[arg(long)]
        title: String,
        /// Inline report body (markdown, $...$ math allowed)
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the report body from a file
        #[arg(long)]
        body_file: Option<std::path::PathBuf>,
        /// Mark the report urgent (priority email headers)
        #[arg(long)]
        urgent: bool,
        /// Attachment files
        files: Vec<std::path::PathBuf>,
    },
    /// List reports matching the given filters, newest first
    List {
        /// Filter by agent name
        #[arg(long)]
        agent: Option<String>,
        /// Filter by 4-character tag
        #[arg(long)]
        tag: Option<String>,
        /// Filter by date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Filter by hour (0-23)
        #[arg(long)]
        hour: Option<u8>,
        /// Filter by minute (0-59)
        #[arg(long)]
        minute: Option<u8>,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
        /// Scan the whole store instead of the most recent window
        #[arg(long)]
        include_ancient: bool,
    },
    /// Fetch one report: the newest match for a tag or coordinates
    Get {
        /// 4-character tag
        #[arg(long)]
        tag: Option<String>,
        /// Agent name
        #[arg(long)]
        agent: Option<String>,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Hour (0-23)
        #[arg(long)]
        hour: Option<u8>,
        /// Minute (0-59)
        #[arg(long)]
        minute: Option<u8>,
        /// Scan the whole store instead of the most recent window
        #[arg(long)]
        include_ancient: bool,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration from environment")?;
    let service = ReportService::new(config)
        .await
        .context("Failed to initialize the report service")?;

    match cli.command {
        Commands::Submit {
            agent,
            title,
            body,
            body_file,
            urgent,
            files,
        } => {
            let outcome = service
                .submit(SubmitRequest {
                    agent_name: agent,
                    title,
                    body,
                    body_file,
                    files,
                    urgent,
                })
                .await?;
            print_json(&outcome)?;
        }
        Commands::List {
            agent,
            tag,
            date,
            hour,
            minute,
            limit,
            include_ancient,
        } => {
            let criteria = SearchCriteria {
                tag,
                agent_name: agent,
                date,
                hour,
                minute,
                include_ancient,
                max_results: limit,
            };
            let reports = service.finder().find(&criteria).await?;
            print_json(&reports)?;
        }
        Commands::Get {
            tag,
            agent,
            date,
            hour,
            minute,
            include_ancient,
        } => {
            if tag.is_none() && agent.is_none() && date.is_none() {
                anyhow::bail!("get requires --tag or agent/time coordinates");
            }
            let criteria = SearchCriteria {
                tag,
                agent_name: agent,
                date,
                hour,
                minute,
                include_ancient,
                max_results: Some(1),
            };
            let report = service.finder().get(&criteria).await?;
            print_json(&report)?;
        }
    }

    Ok(())
}
