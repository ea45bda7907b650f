#![forbid(unsafe_code)]

//! `estimate-desk`: track insurance estimates from the command line.
//!
//! Loads configuration, opens the local mirror, reconciles with the remote
//! table when credentials are present, then runs one subcommand.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use estimate_desk::analytics;
use estimate_desk::config::{GlobalConfig, RemoteCredentials};
use estimate_desk::models::{Estimate, EstimateStatus, EstimateType, IntakeForm, LooseNumber};
use estimate_desk::startup;
use estimate_desk::timefmt::{format_12h, parse_time_input};
use estimate_desk::views::{self, reports::DATE_FORMAT};
use estimate_desk::{AppError, EstimateStore, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "estimate-desk", about = "Insurance estimate tracker", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory; overrides `data_dir` from the config file.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every tracked estimate.
    List,

    /// Record a new estimate request.
    Add {
        /// Estimate type: initial or final.
        #[arg(long = "type")]
        estimate_type: EstimateType,
        /// Insurance claim number.
        #[arg(long)]
        claim: String,
        /// Client name.
        #[arg(long)]
        client: String,
        /// Client task number.
        #[arg(long)]
        task: String,
        /// Date received (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Time received, e.g. `14:30` or `2:30 pm`; defaults to now.
        #[arg(long)]
        time: Option<String>,
        /// Store a predicted completion time with the estimate.
        #[arg(long)]
        predict: bool,
    },

    /// Mark an estimate as in progress.
    Start {
        /// Estimate id.
        id: i64,
    },

    /// Mark an estimate as done.
    Complete {
        /// Estimate id.
        id: i64,
        /// Date returned (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Time returned; defaults to now.
        #[arg(long)]
        time: Option<String>,
        /// Estimate amount in dollars.
        #[arg(long)]
        amount: Option<String>,
    },

    /// Set the dollar amount of an estimate.
    Amount {
        /// Estimate id.
        id: i64,
        /// Amount in dollars; an empty string clears it.
        value: String,
    },

    /// Mark an estimate as billed to the client.
    Bill {
        /// Estimate id.
        id: i64,
    },

    /// Delete an estimate.
    Delete {
        /// Estimate id.
        id: i64,
    },

    /// Show the open work queue.
    Queue {
        /// List in stored order instead of by priority.
        #[arg(long)]
        no_priority: bool,
    },

    /// Show finals awaiting billing.
    Billing,

    /// Show completions for one day.
    Daily {
        /// Day to report (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show productivity for the week containing a day.
    Weekly {
        /// Any day in the week (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Paid time off hours this week.
        #[arg(long, default_value_t = 0.0)]
        pto: f64,
        /// Overtime hours this week.
        #[arg(long, default_value_t = 0.0)]
        ot: f64,
    },

    /// Show the insight summary.
    Insights,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = resolve_config(args.config.as_ref(), args.data_dir)?;
    let credentials = RemoteCredentials::load().await;
    let mut store = startup::open_store(&config, credentials.as_ref()).await?;
    info!(
        remote = store.mode().is_configured(),
        count = store.estimates().len(),
        "estimate store ready"
    );

    let today = Local::now().date_naive();
    let now = Local::now().format("%H:%M").to_string();

    match args.command {
        Command::List => {
            for est in store.estimates() {
                println!("{}", describe(est));
            }
        }
        Command::Add {
            estimate_type,
            claim,
            client,
            task,
            date,
            time,
            predict,
        } => {
            let form = IntakeForm {
                estimate_type,
                claim_number: claim,
                client_name: client,
                task_number: task,
                date_received: date.unwrap_or(today).format(DATE_FORMAT).to_string(),
                time_received: time.map_or(now, |t| parse_time_input(&t)),
            };
            let predicted = predict.then(|| {
                let open = views::work_queue(store.estimates()).len();
                analytics::predict_completion_time(estimate_type, open, &mut rand::rng())
            });
            if let Some(prediction) = &predicted {
                println!(
                    "predicted {} days ({}% confident): {}",
                    prediction.days, prediction.confidence, prediction.reasoning
                );
            }
            let est = Estimate::from_intake(form, store.next_id(), predicted.map(|p| p.days));
            let id = est.id;
            store.add(est).await?;
            print_by_id(&store, id);
        }
        Command::Start { id } => {
            let est = store.set_status(id, EstimateStatus::InProgress).await?;
            println!("{}", describe(&est));
        }
        Command::Complete {
            id,
            date,
            time,
            amount,
        } => {
            let amount = amount.as_deref().map(parse_amount).transpose()?;
            let est = store
                .complete(
                    id,
                    date.unwrap_or(today).format(DATE_FORMAT).to_string(),
                    time.map_or(now, |t| parse_time_input(&t)),
                    amount,
                )
                .await?;
            println!("{}", describe(&est));
        }
        Command::Amount { id, value } => {
            let est = store.set_amount(id, parse_amount(&value)?).await?;
            println!("{}", describe(&est));
        }
        Command::Bill { id } => {
            let est = store.mark_billed(id).await?;
            println!("{}", describe(&est));
        }
        Command::Delete { id } => {
            store.delete(id).await;
            println!("deleted {id}");
        }
        Command::Queue { no_priority } => {
            let queue = views::work_queue(store.estimates());
            if no_priority {
                for est in queue {
                    println!("{}", describe(est));
                }
            } else {
                let owned: Vec<Estimate> = queue.into_iter().cloned().collect();
                for item in analytics::prioritize_work_queue(&owned, &mut rand::rng()) {
                    println!(
                        "[{:<6}] {}  ({})",
                        item.priority.as_str(),
                        describe(&item.estimate),
                        item.reasoning
                    );
                }
            }
        }
        Command::Billing => {
            let billing = views::billing_queue(store.estimates());
            for est in &billing.items {
                println!("{}", describe(est));
            }
            println!("total: ${:.2}", billing.total);
        }
        Command::Daily { date } => {
            print_json(&views::daily_summary(store.estimates(), date.unwrap_or(today)))?;
        }
        Command::Weekly { date, pto, ot } => {
            print_json(&views::weekly_report(
                store.estimates(),
                date.unwrap_or(today),
                pto,
                ot,
            ))?;
        }
        Command::Insights => {
            print_json(&views::insights(store.estimates(), today, &mut rand::rng()))?;
        }
    }

    Ok(())
}

fn resolve_config(path: Option<&PathBuf>, data_dir: Option<PathBuf>) -> Result<GlobalConfig> {
    match (path, data_dir) {
        (Some(path), data_dir) => {
            let mut config = GlobalConfig::load_from_path(path)?;
            if let Some(dir) = data_dir {
                config.data_dir = dir;
            }
            Ok(config)
        }
        (None, Some(dir)) => GlobalConfig::with_data_dir(dir),
        (None, None) => Err(AppError::Config(
            "either --config or --data-dir is required".into(),
        )),
    }
}

fn parse_amount(raw: &str) -> Result<LooseNumber> {
    let trimmed = raw.trim().trim_start_matches('$');
    if trimmed.is_empty() {
        return Ok(LooseNumber::Text(String::new()));
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .map(LooseNumber::Number)
        .map_err(|_| AppError::Validation(format!("not a dollar amount: {raw}")))
}

fn describe(est: &Estimate) -> String {
    let mut line = format!(
        "{:>14}  {:<7} {:<11} claim {} / {} / task {}",
        est.id,
        est.estimate_type,
        est.status,
        est.claim_number,
        est.client_name,
        est.task_number
    );
    if let Some(date) = est.date_received.as_deref().filter(|d| !d.is_empty()) {
        let time = format_12h(est.time_received.as_deref().unwrap_or_default());
        line.push_str(&format!("  received {date} {time}"));
    }
    if let Some(date) = est.date_returned.as_deref().filter(|d| !d.is_empty()) {
        let time = format_12h(est.time_returned.as_deref().unwrap_or_default());
        line.push_str(&format!("  returned {date} {time}"));
    }
    if let Some(amount) = est.amount() {
        line.push_str(&format!("  ${amount:.2}"));
    }
    if est.estimate_type == EstimateType::Final && est.client_billed {
        line.push_str("  billed");
    }
    line
}

fn print_by_id(store: &EstimateStore, id: i64) {
    if let Some(est) = store.get(id) {
        println!("{}", describe(est));
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
