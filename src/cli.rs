//! Command-line interface

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "gmail-hotkey-sender")]
#[command(version)]
#[command(about = "Send Gmail emails via CLI with hotkey support", long_about = None)]
pub struct Cli {
    /// Recipient email address(es), comma-separated
    #[arg(short, long, value_name = "EMAIL")]
    pub to: Option<String>,

    /// Email subject
    #[arg(short, long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Email body
    #[arg(short, long, value_name = "TEXT")]
    pub body: Option<String>,

    /// CC recipient(s), comma-separated
    #[arg(long, value_name = "EMAILS")]
    pub cc: Option<String>,

    /// BCC recipient(s), comma-separated
    #[arg(long, value_name = "EMAILS")]
    pub bcc: Option<String>,

    /// HTML email body
    #[arg(long, value_name = "HTML")]
    pub html: Option<String>,

    /// Create a draft instead of sending
    #[arg(long)]
    pub draft: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// One-line usage reminder
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}

/// Spinner shown while authenticating and dispatching
pub struct ProgressReporter {
    spinner_style: ProgressStyle,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed:>6}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");

        Self { spinner_style }
    }

    pub fn add_spinner(&self, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(self.spinner_style.clone());
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Clear the spinner and print the outcome line
    pub fn finish_spinner(&self, pb: &ProgressBar, msg: &str) {
        pb.finish_and_clear();
        println!("  ✓ {}", msg);
    }

    pub fn fail_spinner(&self, pb: &ProgressBar, msg: &str) {
        pb.finish_and_clear();
        eprintln!("  ✗ {}", msg);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
