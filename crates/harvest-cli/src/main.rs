mod app;
mod config;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "harvest", version, about = "Anonymized job-vacancy ingestion pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ingestion pass over all registered sources
    Pipeline,
    /// Run the periodic vacancy forwarding scheduler
    Cron,
    /// Operate on the remote vacancy service
    Vacancy {
        #[command(subcommand)]
        action: VacancyCommands,
    },
}

#[derive(Subcommand)]
enum VacancyCommands {
    /// Create a vacancy on the remote service
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        company: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Posting date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        posted_at: Option<String>,

        #[arg(long, default_value = "")]
        location: String,
    },

    /// Delete a vacancy by its remote id
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },

    /// Delete all vacancies on the remote service
    Purge,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            std::process::exit(1);
        }
    };

    if let Err(error) = run(cli).await {
        tracing::error!(error = %error, "command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = App::new(AppConfig::from_env());

    match cli.command {
        Commands::Pipeline => run_pipeline(&app).await?,
        Commands::Cron => run_cron(&app).await?,
        Commands::Vacancy { action } => run_vacancy(&app, action).await?,
    }

    app.shutdown().await;
    Ok(())
}

/// One orchestrator pass; termination signals interrupt it between sources
/// and between batches.
async fn run_pipeline(app: &App) -> anyhow::Result<()> {
    let orchestrator = app.orchestrator().await?;

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone())?;

    tracing::info!("starting the pipeline");
    orchestrator.run(&cancel).await;
    tracing::info!("pipeline completed");
    Ok(())
}

/// Run the forwarding scheduler until a termination signal arrives.
async fn run_cron(app: &App) -> anyhow::Result<()> {
    let scheduler = app.forwarder().await?;
    let driver = scheduler.start();

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
        _ = sigquit.recv() => {}
    }
    tracing::info!("received termination signal, shutting down");

    scheduler.stop();
    let _ = driver.await;
    Ok(())
}

async fn run_vacancy(app: &App, action: VacancyCommands) -> anyhow::Result<()> {
    let token = app.generate_token().await?;
    let client = app.vacancy_client().await?;

    match action {
        VacancyCommands::Create {
            title,
            company,
            description,
            posted_at,
            location,
        } => {
            let posted_at =
                posted_at.unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());
            let response = client
                .create(&token, &title, &company, &description, &posted_at, &location)
                .await?;
            println!("Created vacancy: {}", response.id);
        }

        VacancyCommands::Delete { id } => {
            client.delete(&token, id).await?;
            println!("Deleted vacancy: {id}");
        }

        VacancyCommands::Purge => {
            client.purge(&token).await?;
            println!("Purged all vacancies");
        }
    }

    Ok(())
}

/// Cancel the given token on SIGINT, SIGTERM or SIGQUIT.
fn spawn_shutdown_listener(cancel: CancellationToken) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
            _ = sigquit.recv() => {}
        }
        tracing::info!("received termination signal, shutting down gracefully");
        cancel.cancel();
    });

    Ok(())
}
