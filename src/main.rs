use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neuroscan::app::App;
use neuroscan::classifier::OnnxClassifier;
use neuroscan::models::Config;
use neuroscan::pipeline;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "neuroscan")]
#[command(about = "Brain tumor detection from MRI scans")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web app (default).
    Serve {
        /// Address to listen on, overrides NEUROSCAN_BIND_ADDR.
        #[arg(long)]
        bind: Option<String>,
        /// ONNX model file, overrides NEUROSCAN_MODEL_PATH.
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Classify one image and print the report.
    Diagnose {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
        #[arg(long)]
        model: Option<PathBuf>,
        /// Also write the report to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuroscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    match args.command {
        None => serve(config).await,
        Some(Command::Serve { bind, model }) => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(model) = model {
                config.model_path = model;
            }
            serve(config).await
        }
        Some(Command::Diagnose { image, model, out }) => {
            if let Some(model) = model {
                config.model_path = model;
            }
            diagnose(config, image, out).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting NeuroScan AI");

    let app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    app.serve().await.context("Server error")
}

async fn diagnose(config: Config, image: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let classifier = match OnnxClassifier::load(&config.model_path) {
        Ok(classifier) => classifier,
        Err(e) => {
            error!("Failed to load model: {}", e);
            std::process::exit(1);
        }
    };

    let diagnosis = pipeline::analyze_file(&classifier, &image)
        .await
        .with_context(|| format!("Failed to analyze {}", image.display()))?;

    println!("{}", diagnosis.verdict.banner());
    println!("{}", diagnosis.report());

    if let Some(out) = out {
        tokio::fs::write(&out, diagnosis.report().as_str())
            .await
            .with_context(|| format!("Failed to write report to {}", out.display()))?;
        info!("Report written to {}", out.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_serve() {
        let args = CliArgs::try_parse_from(["neuroscan"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_serve_overrides() {
        let args =
            CliArgs::try_parse_from(["neuroscan", "serve", "--bind", "127.0.0.1:9000"]).unwrap();
        match args.command {
            Some(Command::Serve { bind, model }) => {
                assert_eq!(bind.as_deref(), Some("127.0.0.1:9000"));
                assert!(model.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_diagnose_requires_image() {
        assert!(CliArgs::try_parse_from(["neuroscan", "diagnose"]).is_err());

        let args = CliArgs::try_parse_from([
            "neuroscan",
            "diagnose",
            "scan.png",
            "--out",
            "report.txt",
        ])
        .unwrap();
        match args.command {
            Some(Command::Diagnose { image, out, .. }) => {
                assert_eq!(image, PathBuf::from("scan.png"));
                assert_eq!(out, Some(PathBuf::from("report.txt")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
