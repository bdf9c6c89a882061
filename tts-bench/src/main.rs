// tts-bench - Synthesize the same text with several cloud TTS services and time each call

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::TtsBenchConfig;
use speech_client::{
    Dispatcher, EnvResolver, Outcome, Provider, SynthesisRequest, SynthesisResult,
};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "tts-bench")]
#[command(
    about = "Synthesize the same text with Azure, OpenAI and Google text-to-speech and time each call",
    long_about = None
)]
#[command(version)]
struct Args {
    /// Text to synthesize (default: configured text)
    #[arg(long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the text to synthesize from a file
    #[arg(long, value_name = "PATH")]
    text_file: Option<PathBuf>,

    /// Provider to run: azure, openai or google (repeatable, default: all)
    #[arg(short, long = "provider", value_name = "PROVIDER")]
    providers: Vec<Provider>,

    /// Directory for the MP3 files (default: Audios)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Per-provider timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Call the providers concurrently
    #[arg(long)]
    parallel: bool,

    /// Do not print elapsed times
    #[arg(long)]
    no_timer: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Configuration subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Key to set, e.g. output_dir or openai.voice
        key: String,
        /// New value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let _ = dotenvy::dotenv();

    let config = TtsBenchConfig::load().context("Failed to load configuration")?;

    let failed = run(&args, &config).await?;
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Run every selected provider, returning how many failed
async fn run(args: &Args, config: &TtsBenchConfig) -> Result<usize> {
    let text = match (&args.text, &args.text_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?,
        (None, None) => config.text.clone(),
    };

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output_dir));

    let timeout_secs = args.timeout.unwrap_or(config.timeout_secs);
    if timeout_secs == 0 {
        anyhow::bail!("Timeout must be greater than zero");
    }

    let providers = selected_providers(&args.providers);

    let requests = providers
        .iter()
        .map(|&provider| {
            let voice = config.voice(provider)?;
            SynthesisRequest::in_dir(text.as_str(), voice, &output_dir)
        })
        .collect::<speech_client::Result<Vec<_>>>()
        .context("Invalid synthesis request")?;

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    log::debug!("Output directory: {}", output_dir.display());
    log::debug!("Providers: {:?}", providers);
    log::debug!("Timeout: {}s, parallel: {}", timeout_secs, args.parallel);

    let dispatcher = Dispatcher::new(EnvResolver::new(config.credential_sources()))
        .with_timeout(Duration::from_secs(timeout_secs));

    let results = dispatcher
        .synthesize_all_with(&requests, args.parallel, |result| {
            println!("{}", format_result(result, !args.no_timer))
        })
        .await;

    let failed = results.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        eprintln!("{} of {} providers failed", failed, results.len());
    }

    Ok(failed)
}

/// Providers in the order given, duplicates dropped; all of them when none are given
fn selected_providers(requested: &[Provider]) -> Vec<Provider> {
    if requested.is_empty() {
        return Provider::ALL.to_vec();
    }

    let mut providers = Vec::with_capacity(requested.len());
    for provider in requested {
        if !providers.contains(provider) {
            providers.push(*provider);
        }
    }
    providers
}

fn format_result(result: &SynthesisResult, timer: bool) -> String {
    let line = match &result.outcome {
        Outcome::Success { bytes_written } => format!(
            "{}: wrote {} bytes to {}",
            result.provider,
            bytes_written,
            result.output_path.display()
        ),
        Outcome::Failure { kind, message } => {
            format!("{}: {}: {}", result.provider, kind, message)
        }
    };

    if timer {
        format!("{} ({:.3}s)", line, result.elapsed.as_secs_f64())
    } else {
        line
    }
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = TtsBenchConfig::load()?;
            println!("Configuration file: {:?}", TtsBenchConfig::config_path()?);
            println!();
            println!("output_dir = \"{}\"", config.output_dir);
            println!("timeout_secs = {}", config.timeout_secs);
            println!("text = {:?}", config.text);
            println!();
            println!("[azure]");
            println!("voice = \"{}\"", config.azure.voice);
            println!("key_env = \"{}\"", config.azure.key_env);
            println!("region_env = \"{}\"", config.azure.region_env);
            println!();
            println!("[openai]");
            println!("model = \"{}\"", config.openai.model);
            println!("voice = \"{}\"", config.openai.voice);
            println!("language = \"{}\"", config.openai.language);
            println!("api_key_env = \"{}\"", config.openai.api_key_env);
            println!();
            println!("[google]");
            println!("language_code = \"{}\"", config.google.language_code);
            println!("voice = \"{}\"", config.google.voice);
            println!("gender = \"{}\"", config.google.gender);
            println!("credentials_path = \"{}\"", config.google.credentials_path);
        }
        ConfigAction::Set { key, value } => {
            let mut config = TtsBenchConfig::load()?;
            config.set(key, value)?;
            config.save()?;
            println!("{} set to: {}", key, value);
        }
    }
    Ok(())
}
