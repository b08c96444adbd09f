//! CLI entry point for `bouncescan`.

use std::path::PathBuf;
use std::time::Instant;

use clap::{CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use bouncescan::config::{Config, OutputFormat};
use bouncescan::model::{Disposition, DispositionPolicy, Mail};
use bouncescan::report::{self, Report};
use bouncescan::resolve::StatusExplanation;
use bouncescan::source::EmlFileSource;

#[derive(Parser)]
#[command(
    name = "bouncescan",
    version,
    about = "Classify bounce, feedback-loop and autoreply e-mails"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more .eml files
    Classify {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Explain an RFC 1893 status code
    Explain {
        status: String,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = bouncescan::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let default_json = config.output.format == OutputFormat::Json;

    match cli.command {
        Commands::Classify { files, json } => {
            cmd_classify(files, json || default_json, &config.disposition_policy())
        }
        Commands::Explain { status, json } => cmd_explain(&status, json || default_json),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_path = bouncescan::config::log_file_path(config);
    let log_dir = bouncescan::config::cache_dir(config);
    let log_name = log_path.file_name().unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Classify message files and print the results.
fn cmd_classify(files: Vec<PathBuf>, json: bool, policy: &DispositionPolicy) -> anyhow::Result<()> {
    let mut source = EmlFileSource::new(files);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Classifying [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = report::process(
        &mut source,
        None,
        policy,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    );
    pb.finish_and_clear();
    let elapsed = start.elapsed();

    if json {
        print_report_json(&report, policy)?;
    } else {
        print_report_table(&report, policy, elapsed);
    }

    if report.counter.total > 0 && report.counter.failed == report.counter.total {
        anyhow::bail!("no message could be read");
    }
    Ok(())
}

/// Explain a status code.
fn cmd_explain(status: &str, json: bool) -> anyhow::Result<()> {
    let explanation = bouncescan::explain_status_code(status);
    if explanation.code.is_none() {
        anyhow::bail!("not a status code: {status}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
    } else {
        print_explanation(&explanation);
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "bouncescan", &mut std::io::stdout());
    Ok(())
}

fn disposition_label(disposition: Disposition) -> &'static str {
    match disposition {
        Disposition::HardBounce => "remove",
        Disposition::Processed => "keep",
        Disposition::Unprocessed { purge: true } => "purge",
        Disposition::Unprocessed { purge: false } => "unprocessed",
    }
}

/// Print classification results as a human-readable table.
fn print_report_table(report: &Report, policy: &DispositionPolicy, elapsed: std::time::Duration) {
    println!();
    println!(
        "  {:<24} {:<6} {:<30} {:<7} {:<10} {:<15} {:<11}",
        "Message", "Type", "Recipient", "Status", "Action", "Category", "Disposition"
    );
    println!("  {}", "-".repeat(109));

    for mail in &report.mails {
        print_mail_rows(mail, policy);
    }

    println!();
    let c = &report.counter;
    println!("  {:<20} {}", "Messages", c.total);
    println!("  {:<20} {}", "Processed", c.processed);
    println!("  {:<20} {}", "Unprocessed", c.unprocessed);
    println!("  {:<20} {}", "Hard bounces", report.hard_bounces(policy).count());
    if c.failed > 0 {
        println!("  {:<20} {}", "Failed", c.failed);
        for err in &report.errors {
            println!("    {err}");
        }
    }
    println!("  {:<20} {:.2?}", "Time", elapsed);
    println!();
}

fn print_mail_rows(mail: &Mail, policy: &DispositionPolicy) {
    let token: String = mail.token.to_string().chars().take(23).collect();
    let mail_type = mail.mail_type.map_or("-", |t| t.as_str());
    let disposition = disposition_label(mail.disposition(policy));

    if mail.recipients.is_empty() {
        println!(
            "  {:<24} {:<6} {:<30} {:<7} {:<10} {:<15} {:<11}",
            token, mail_type, "-", "-", "-", "-", disposition
        );
        return;
    }

    for rcpt in &mail.recipients {
        let email: String = rcpt.email.as_deref().unwrap_or("-").chars().take(29).collect();
        println!(
            "  {:<24} {:<6} {:<30} {:<7} {:<10} {:<15} {:<11}",
            token,
            mail_type,
            email,
            rcpt.status.as_deref().unwrap_or("-"),
            rcpt.action.map_or("-", |a| a.as_str()),
            rcpt.bounce_category.as_str(),
            disposition
        );
    }
}

/// Print classification results as JSON.
fn print_report_json(report: &Report, policy: &DispositionPolicy) -> anyhow::Result<()> {
    let mails: Vec<serde_json::Value> = report
        .mails
        .iter()
        .map(|mail| {
            serde_json::json!({
                "mail": mail,
                "disposition": mail.disposition(policy),
            })
        })
        .collect();

    let output = serde_json::json!({
        "counter": report.counter,
        "mails": mails,
        "errors": report.errors,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_explanation(explanation: &StatusExplanation) {
    println!();
    if let Some(code) = &explanation.code {
        println!("  {code}");
    }
    for subcode in [
        explanation.first_subcode,
        explanation.second_subcode,
        explanation.third_subcode,
    ]
    .into_iter()
    .flatten()
    {
        println!();
        println!("  {}", subcode.title);
        println!("    {}", subcode.desc);
    }
    println!();
}
