use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use gmail_hotkey_sender::cli::{self, Cli, ProgressReporter};
use gmail_hotkey_sender::error::SenderError;
use gmail_hotkey_sender::{
    AuditLog, ConfigStore, ConsoleTransport, CredentialsFileAuth, EmailDispatcher, RequestParser,
};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Exit with proper code on error
    if let Err(e) = run().await {
        display_error(&e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = e.print();
                process::exit(0);
            }
            _ => {
                let _ = e.print();
                process::exit(1);
            }
        },
    };

    // Initialize tracing with level based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_hotkey_sender=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_hotkey_sender=info,warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Validation happens before any file, credential or transport is touched
    let invocation = match RequestParser::parse_cli(&cli) {
        Ok(invocation) => invocation,
        Err(e) if e.is_user_error() => {
            eprintln!("Error: {}", e);
            eprintln!("\n{}", cli::usage());
            process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let store = ConfigStore::resolve(invocation.config_path.clone())?;
    let config = store.load().await;
    let request = invocation.args.into_request(&config);

    let auth = CredentialsFileAuth::new(
        store.resolve_relative(&config.credentials_file),
        store.resolve_relative(&config.token_file),
    );
    let mut dispatcher = EmailDispatcher::new(
        Box::new(auth),
        Box::new(ConsoleTransport),
        &config,
        AuditLog::at_default_location(),
    );

    let progress = ProgressReporter::new();
    let action = if request.is_draft() {
        "Creating draft"
    } else {
        "Sending email"
    };
    let spinner = progress.add_spinner(&format!("{} to {}...", action, request.recipient_line()));

    match dispatcher.dispatch(&request).await {
        Ok(()) => {
            progress.finish_spinner(&spinner, &format!("{} to {}", action, request.recipient_line()));
            println!("Operation completed successfully");
            Ok(())
        }
        Err(e) => {
            progress.fail_spinner(&spinner, action);
            Err(e.into())
        }
    }
}

/// Display error with context
fn display_error(error: &anyhow::Error) {
    eprintln!("Error: {}", error);

    // Display error chain
    let mut cause = error.source();
    while let Some(e) = cause {
        eprintln!("  Caused by: {}", e);
        cause = e.source();
    }

    // Display helpful hints based on error type
    if let Some(sender_err) = error.downcast_ref::<SenderError>() {
        match sender_err {
            SenderError::AuthError(_) => {
                eprintln!("\nHint: Make sure your credentials.json file is valid.");
                eprintln!("      You can download it from Google Cloud Console,");
                eprintln!("      or set GMAIL_CLIENT_ID and GMAIL_CLIENT_SECRET.");
            }
            SenderError::TransportError(_) => {
                eprintln!("\nHint: This may be a temporary provider error.");
                eprintln!("      Try running the command again.");
            }
            SenderError::ConfigRead(_) | SenderError::ConfigWrite(_) => {
                eprintln!("\nHint: Check your configuration file for errors.");
                eprintln!("      Pass another file with --config <PATH>.");
            }
            _ => {}
        }
    }
}
