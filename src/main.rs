// SPDX-License-Identifier: GPL-3.0-or-later

use std::env;
use std::fs;
use std::process::Command;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::error;
use tracing_subscriber::EnvFilter;

use serverfund::config::Config;
use serverfund::error::FundError;
use serverfund::ledger::{DonationRecord, format_money};
use serverfund::reconcile::FundingReport;
use serverfund::report::{Banner, html, json, terminal};
use serverfund::service;
use serverfund::storage::Storage;

#[derive(Parser)]
#[command(
    name = "serverfund",
    about = "Report a community server's funding status from its donation ledger",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the server's funding status
    Fund {
        /// Output format
        #[arg(long, default_value = "terminal")]
        format: ReportFormat,
    },

    /// Show the funding greeting players see when they join
    Welcome,

    /// Print the donation link
    Donate,

    /// Record and list donations
    Donation {
        #[command(subcommand)]
        command: DonationCommands,
    },

    /// Show or update the cumulative spending total
    Spending {
        #[command(subcommand)]
        command: Option<SpendingCommands>,
    },

    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Clone, clap::ValueEnum)]
enum ReportFormat {
    Terminal,
    Plain,
    Json,
    Html,
}

#[derive(Subcommand)]
enum DonationCommands {
    /// Record a received donation
    Add {
        /// Donor name
        name: String,

        /// Amount received
        #[arg(value_parser = parse_amount)]
        amount: Decimal,

        /// Day the donation arrived (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Currency code (defaults to the configured currency)
        #[arg(long)]
        currency: Option<String>,
    },

    /// List every recorded donation
    List,
}

#[derive(Subcommand)]
enum SpendingCommands {
    /// Show total spending to date
    Show,

    /// Replace the spending total
    Set {
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
    },

    /// Add an expense to the spending total
    Add {
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Open configuration file in $EDITOR
    Edit,
}

fn parse_amount(s: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(s.trim()).map_err(|_| format!("'{s}' is not an amount"))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err("amount must not be negative".to_string());
    }
    Ok(amount)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Fund {
        format: ReportFormat::Terminal,
    });

    // Reports degrade on a broken config; everything else fails hard.
    match command {
        Commands::Fund { format } => cmd_fund(&format, Banner::Fund).await,
        Commands::Welcome => cmd_fund(&ReportFormat::Terminal, Banner::Welcome).await,
        Commands::Donate => cmd_donate(&Config::load()?),
        Commands::Donation { command } => cmd_donation(&Config::load()?, command),
        Commands::Spending { command } => cmd_spending(&Config::load()?, command),
        Commands::Config { command } => cmd_config(&Config::load()?, &command),
    }
}

/// Log to stderr so `--format json` output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("SERVERFUND_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("serverfund=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn cmd_fund(format: &ReportFormat, banner: Banner) -> Result<()> {
    let (report, config) = match Config::load() {
        Ok(config) => {
            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
            spinner.set_message("Retrieving funding information...");
            spinner.enable_steady_tick(Duration::from_millis(100));

            let report = service::ledger_report(&config).await;
            spinner.finish_and_clear();
            (report, config)
        }
        Err(e) => {
            error!("could not load configuration: {e:#}");
            let message = FundError::Configuration(e.to_string()).user_message();
            (FundingReport::unavailable(message), Config::default())
        }
    };

    match format {
        ReportFormat::Terminal => terminal::print_report(&report, &config, banner),
        ReportFormat::Plain => terminal::print_plain(&report, &config, banner),
        ReportFormat::Json => json::print_json(&report, &config)?,
        ReportFormat::Html => html::print_html(&report, &config),
    }

    Ok(())
}

fn cmd_donate(config: &Config) -> Result<()> {
    let url = config
        .donation_link()
        .context("Set donation_url with `serverfund config edit`")?;
    println!("Click here to donate: {url}");
    Ok(())
}

fn cmd_donation(config: &Config, command: DonationCommands) -> Result<()> {
    let storage = Storage::open(config)?;

    match command {
        DonationCommands::Add {
            name,
            amount,
            date,
            currency,
        } => {
            let record = DonationRecord::new(
                name,
                amount,
                date.unwrap_or_else(|| Local::now().date_naive()),
                currency.unwrap_or_else(|| config.currency.clone()),
            );
            let id = storage
                .save_donation(&record)
                .context("Failed to record donation")?;
            eprintln!(
                "Recorded donation #{id}: {} {} from {} on {}",
                format_money(record.amount),
                record.currency.to_uppercase(),
                record.donor_name,
                record.occurred_on
            );
        }
        DonationCommands::List => {
            let donations = storage
                .all_donations()
                .context("Failed to read donations")?;
            if donations.is_empty() {
                eprintln!("No donations recorded. Add one with `serverfund donation add`.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["ID", "Date", "Donor", "Amount", "Currency"]);
            for stored in &donations {
                table.add_row(vec![
                    stored.id.to_string(),
                    stored.record.occurred_on.to_string(),
                    stored.record.donor_name.clone(),
                    format_money(stored.record.amount),
                    stored.record.currency.clone(),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

fn cmd_spending(config: &Config, command: Option<SpendingCommands>) -> Result<()> {
    let storage = Storage::open(config)?;

    let total = match command {
        None | Some(SpendingCommands::Show) => storage.total_spending()?,
        Some(SpendingCommands::Set { amount }) => {
            storage.set_total_spending(amount)?;
            amount
        }
        Some(SpendingCommands::Add { amount }) => storage.add_spending(amount)?,
    };

    println!("Total spending: {}", format_money(total));
    Ok(())
}

fn cmd_config(config: &Config, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => cmd_config_show(config),
        Some(ConfigCommands::Edit) => cmd_config_edit(),
    }
}

fn cmd_config_show(config: &Config) -> Result<()> {
    let path = Config::config_path()?;
    eprintln!("# {}", path.display());

    let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
    print!("{toml}");
    Ok(())
}

fn cmd_config_edit() -> Result<()> {
    let path = Config::config_path()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    if !path.exists() {
        let default_toml = toml::to_string_pretty(&Config::default())
            .context("Failed to serialize default config")?;
        fs::write(&path, &default_toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        eprintln!("Created default config at {}", path.display());
    }

    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor '{editor}'"))?;

    if !status.success() {
        anyhow::bail!("Editor '{editor}' exited with {status}");
    }

    Ok(())
}
