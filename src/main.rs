use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use subscriber_report::{
    AppError, Config,
    external::RevenueCatClient,
    models::ListCustomersParams,
    services::ReportService,
    utils::RetryPolicy,
};

/// Subscriber reports for a RevenueCat project
#[derive(Parser, Debug)]
#[command(name = "subscriber-report", version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Customers per page (1-1000)
    #[arg(long, global = true)]
    limit: Option<u32>,

    /// Cursor from a previous page's next_page
    #[arg(long, global = true, env = "REVENUECAT_STARTING_AFTER")]
    starting_after: Option<String>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// List customers and their entitlements
    Subscribers,
    /// Summarize active subscriptions, products and renewal status
    Active,
}

fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stderr)
        .init();
}

async fn run(command: Command, config: &Config, params: ListCustomersParams) -> anyhow::Result<()> {
    let client = RevenueCatClient::new(config.revenuecat.clone(), RetryPolicy::from(&config.retry))
        .context("Failed to build HTTP client")?;
    let service = ReportService::new(client, config.revenuecat.project_id.clone());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Subscribers => {
            writeln!(out, "Fetching subscribers...\n")?;
            service
                .subscribers(&mut out, &params)
                .await
                .context("Error fetching subscribers")?;
        }
        Command::Active => {
            writeln!(out, "Fetching active subscriptions...\n")?;
            service
                .active_subscriptions(&mut out, &params, Utc::now())
                .await
                .context("Error fetching active subscriptions")?;
        }
    }
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // .env is optional
    dotenvy::dotenv().ok();
    init_logging();

    let args = Args::parse();

    let config = match Config::from_toml().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let params = ListCustomersParams::new(
        Some(args.limit.unwrap_or_else(|| config.page_limit())),
        args.starting_after,
    );
    let command = args.command.unwrap_or(Command::Active);

    if let Err(e) = run(command, &config, params).await {
        log::error!("{e:#}");
        if let Some((status, body)) = e.downcast_ref::<AppError>().and_then(AppError::response_details) {
            log::error!("Response status: {status}");
            if !body.is_empty() {
                log::error!("Response data: {body}");
            }
        }
        std::process::exit(1);
    }
}
