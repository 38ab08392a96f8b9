//! `mailshield`: train the classifier, query a running server, check setup.

mod client;
mod commands;

use std::io::Read;

use anyhow::Context;
use clap::Parser;
use mailshield_core::corpus::get_corpus;
use mailshield_core::{training, EmailClassifier, TrainingConfig};
use tracing_subscriber::EnvFilter;

use crate::client::{ApiClient, ClientError};
use crate::commands::{CheckArgs, ClassifyArgs, Commands, TrainArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "PII-masking email classifier tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, default_value = "info", help = "Log level when RUST_LOG is unset")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Train(args) => run_train(&args),
        Commands::Classify(args) => run_classify(args).await,
        Commands::Check(args) => run_check(&args),
    }
}

fn run_train(args: &TrainArgs) -> anyhow::Result<()> {
    let config = TrainingConfig::from(args);
    let masker = args.recognizer.masker()?;
    let outcome = training::train(&config, &masker)
        .with_context(|| format!("training from {}", config.data_path.display()))?;

    println!(
        "Trained on {} rows, evaluated on {}.",
        outcome.train_rows, outcome.test_rows
    );
    println!("Accuracy: {:.4}\n", outcome.report.accuracy);
    println!("{}", outcome.report);
    println!("Model saved to {}", config.model_path.display());
    Ok(())
}

async fn run_classify(args: ClassifyArgs) -> anyhow::Result<()> {
    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading email text from stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        tracing::warn!("Empty email text, nothing sent");
        return Ok(());
    }

    let client = ApiClient::new(&args.api_url, &args.api_key)?;
    if client.is_online().await {
        println!("API online at {}", args.api_url);
    } else {
        println!("API offline at {}", args.api_url);
    }

    let response = match client.classify(&text).await {
        Ok(response) => response,
        Err(ClientError::AccessDenied) => {
            anyhow::bail!("Access denied: check API_KEY");
        }
        Err(e) => return Err(e.into()),
    };

    println!("\n{}", client::render(&response));
    if args.json {
        println!("\n{}", serde_json::to_string_pretty(&response)?);
    }
    Ok(())
}

fn run_check(args: &CheckArgs) -> anyhow::Result<()> {
    let pipeline = args.recognizer.pipeline()?;
    let eval = pipeline.evaluate(&get_corpus());
    println!(
        "Recognizer ({}): token accuracy {:.4}, entity recall {:.4} on {} tokens",
        pipeline.mode,
        eval.accuracy(),
        eval.entity_recall(),
        eval.tokens
    );

    let classifier = EmailClassifier::load(&args.model_path)
        .with_context(|| format!("loading classifier from {}", args.model_path.display()))?;
    println!(
        "Classifier ({}): classes {}",
        args.model_path.display(),
        classifier.classes().join(", ")
    );
    println!("Setup OK");
    Ok(())
}
