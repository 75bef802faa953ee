use anyhow::Result;
use clap::Parser;
use gmail_label_export::auth;
use gmail_label_export::cli::{self, Cli, Commands};
use gmail_label_export::client::ProductionGmailClient;
use gmail_label_export::config::Config;
use gmail_label_export::error::GmailError;
use gmail_label_export::menu::InquirePrompter;
use gmail_label_export::progress::ConsoleReporter;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(GmailError::OperationCancelled(_)) = e.downcast_ref::<GmailError>() {
            process::exit(130);
        }
        eprintln!("Error: {}", e);
        eprintln!("\nFor help, run: gmail-label-export --help");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_label_export=debug,info"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("gmail_label_export=warn,error"))
    };

    // Progress lines own stdout; logs go to stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> Result<()> {
    // Install default crypto provider for rustls
    // On non-Windows platforms, use aws-lc-rs; on Windows, use ring
    #[cfg(not(windows))]
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    #[cfg(windows)]
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    tracing::debug!("gmail-label-export starting");

    match &cli.command {
        Some(Commands::InitConfig { output, force }) => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Config file {:?} already exists. Use --force to overwrite.",
                    output
                );
            }
            Config::create_example(output).await?;
            println!("Example configuration written to {:?}", output);
            return Ok(());
        }
        Some(Commands::Auth { force }) => {
            if *force && cli.token_cache.exists() {
                tokio::fs::remove_file(&cli.token_cache).await?;
                tracing::info!("Removed existing token cache");
            }

            let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;
            println!("Successfully authenticated with Gmail API");
            println!("Token cached at: {:?}", cli.token_cache);

            let (_, profile) = hub
                .users()
                .get_profile("me")
                .add_scope(auth::FULL_ACCESS_SCOPE)
                .doit()
                .await
                .map_err(GmailError::from)?;
            println!(
                "Connected to account: {}",
                profile.email_address.unwrap_or_default()
            );
            return Ok(());
        }
        _ => {}
    }

    let config = Config::load(&cli.config).await?;
    let hub = auth::initialize_gmail_hub(&cli.credentials, &cli.token_cache).await?;
    let client = ProductionGmailClient::new(hub);
    let reporter = ConsoleReporter::new();

    cli::run_with_client(cli.command, &client, &reporter, &InquirePrompter, &config).await?;
    Ok(())
}
