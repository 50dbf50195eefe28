use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use extract_smoke::config::{self, SmokeConfig};
use extract_smoke::progress::write_final_results;
use extract_smoke::{ConfigError, ConsoleProgress, SmokeRunner};

/// Exit code for configuration problems, distinct from a failed run.
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "extract-smoke",
    version,
    about = "Upload a synthetic report to the extraction backend and check the extracted fields"
)]
struct Cli {
    /// JSON config file. Defaults to <config dir>/extract-smoke/config.json when present.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Base URL of the extraction backend.
    #[arg(long, value_name = "URL")]
    backend_url: Option<String>,

    /// Patient id sent with the upload and process requests.
    #[arg(long)]
    patient_id: Option<u64>,

    /// Health check timeout in seconds.
    #[arg(long, value_name = "SECS")]
    health_timeout: Option<u64>,

    /// Timeout for upload and process requests in seconds (unbounded if unset).
    #[arg(long, value_name = "SECS")]
    request_timeout: Option<u64>,

    /// Directory the fixture file is written to.
    #[arg(long, value_name = "DIR")]
    fixture_dir: Option<PathBuf>,

    /// Also write a machine-readable report to this path.
    #[arg(long, value_name = "PATH")]
    json_report: Option<PathBuf>,

    /// Increase diagnostic logging on stderr (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn resolve_config(cli: &Cli) -> Result<SmokeConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => match config::default_config_path().filter(|p| p.is_file()) {
            Some(path) => {
                info!("Using config file {}", path.display());
                config::load_config(path)?
            }
            None => SmokeConfig::default(),
        },
    };

    config::apply_env_overrides(&mut config)?;

    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(patient_id) = cli.patient_id {
        config.patient_id = patient_id;
    }
    if let Some(secs) = cli.health_timeout {
        config.health_timeout_secs = secs;
    }
    if let Some(secs) = cli.request_timeout {
        config.request_timeout_secs = Some(secs);
    }
    if let Some(dir) = &cli.fixture_dir {
        config.fixture_dir = dir.clone();
    }

    config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    extract_smoke::logging::init(cli.verbose);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    println!("Starting Enhanced Source Extraction Tests");
    println!("{}", "=".repeat(80));

    let runner = match SmokeRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let progress = ConsoleProgress::stdout();

    if runner.preflight(&progress).await.is_err() {
        return ExitCode::FAILURE;
    }

    let report = runner.run(&progress).await;

    if let Some(path) = &cli.json_report {
        match report.write_json(path) {
            Ok(()) => info!("Wrote JSON report to {}", path.display()),
            Err(e) => error!("{}", e),
        }
    }

    if let Err(e) = write_final_results(&mut std::io::stdout(), report.passed()) {
        error!("Failed to write output: {}", e);
    }

    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
