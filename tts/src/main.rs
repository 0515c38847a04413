//! tts - Convert text and Markdown files to audio with OpenAI text-to-speech

mod audio;
mod dispatch;
mod job;
mod limiter;
mod pipeline;
mod prompt;
mod text;

use anyhow::{Context, Result};
use audio::Combiner;
use clap::{Parser, Subcommand};
use job::JobConfig;
use pipeline::RunOutcome;
use speech_client::{
    ApiKey, AudioFormat, Config, Model, ReqwestTransport, Speed, SpeechClient, SpeechError,
    SpeechSettings, Voice,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "tts")]
#[command(about = "Process text files with OpenAI's Text To Speech API", long_about = None)]
#[command(version)]
struct Args {
    /// Input text or Markdown file
    #[arg(short = 'f', long = "file")]
    input: Option<PathBuf>,

    /// Output audio file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Voice selection: alloy, echo, fable, onyx, nova, shimmer (default: nova)
    #[arg(short, long)]
    voice: Option<Voice>,

    /// Model selection: tts-1, tts-1-hd (default: tts-1-hd)
    #[arg(short, long)]
    model: Option<Model>,

    /// Output format: mp3, opus, aac, flac, wav, pcm (default: mp3)
    #[arg(long = "fmt")]
    format: Option<AudioFormat>,

    /// Audio speed, 0.25 to 4.0 (default: 1.0)
    #[arg(short, long)]
    speed: Option<Speed>,

    /// Place buffer words at start and end of text to help with abrupt starts and ends
    #[arg(short, long)]
    buffer: bool,

    /// Rate limit for API calls per minute (0 = unlimited)
    #[arg(short, long, default_value_t = 0)]
    rate_limit: u32,

    /// Combine multiple files into a single audio file (requires ffmpeg)
    #[arg(short, long)]
    combine: bool,

    /// Enter configuration mode for API key setup
    #[arg(long)]
    configure: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
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
    /// Store the OpenAI API key
    SetApiKey {
        /// The API key
        key: String,
    },
    /// Set default voice
    SetVoice {
        /// alloy, echo, fable, onyx, nova or shimmer
        voice: Voice,
    },
    /// Set default model
    SetModel {
        /// tts-1 or tts-1-hd
        model: Model,
    },
    /// Set default output format
    SetFormat {
        /// mp3, opus, aac, flac, wav or pcm
        format: AudioFormat,
    },
    /// Set default speed
    SetSpeed {
        /// Value (0.25-4.0)
        speed: Speed,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let mut config = Config::load().context("Failed to load configuration")?;

    if args.configure {
        configure_api_key(&mut config)?;
        return Ok(());
    }

    let (Some(input), Some(output)) = (args.input.clone(), args.output.clone()) else {
        anyhow::bail!(
            "Input and output files are required.\n\nUsage: tts -f filename.md -o filename.mp3"
        );
    };

    let job = JobConfig {
        settings: SpeechSettings {
            voice: args.voice.unwrap_or(config.defaults.voice),
            model: args.model.unwrap_or(config.defaults.model),
            format: args.format.unwrap_or(config.defaults.format),
            speed: args.speed.unwrap_or(config.defaults.speed),
        },
        buffer_text: args.buffer,
        rate_limit: args.rate_limit,
        combine: args.combine,
        ..JobConfig::new(input, output)
    };

    // Check before anything is read or sent
    let combiner = if job.combine {
        Some(Combiner::locate()?)
    } else {
        None
    };

    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(SpeechError::MissingApiKey { .. }) => configure_api_key(&mut config)?,
        Err(e) => return Err(e.into()),
    };

    if args.debug {
        log::debug!("Input: {}", job.input.display());
        log::debug!("Output: {}", job.output.display());
        log::debug!("Settings: {:?}", job.settings);
        log::debug!("Buffer text: {}", job.buffer_text);
        log::debug!("Rate limit: {}/min", job.rate_limit);
    }

    let transport = Arc::new(ReqwestTransport::new()?);
    let client = SpeechClient::new(transport, api_key);

    let outcome = pipeline::run(&job, &client, combiner.as_ref(), |count| {
        prompt::confirm_file_count(count, io::stdin().lock(), io::stderr())
            .context("Failed to read confirmation")
    })
    .await?;

    if let RunOutcome::Completed {
        artifacts,
        combined: None,
    } = &outcome
    {
        log::info!("Created {} audio file(s)", artifacts.len());
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Prompt for an API key and persist it.
fn configure_api_key(config: &mut Config) -> Result<ApiKey> {
    let key = prompt::read_api_key(io::stdin().lock(), io::stderr())
        .context("Failed to read API key")?;
    if key.is_empty() {
        anyhow::bail!("No API key entered");
    }

    config.api_key = Some(key.clone());
    config.save().context("Unable to save config file")?;
    log::info!("API key saved to {}", Config::config_path()?.display());

    Ok(ApiKey::new(key))
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    let mut config = Config::load()?;
    match action {
        ConfigAction::Show => {
            println!("Configuration file: {:?}", Config::config_path()?);
            println!();
            if config.api_key.is_some() {
                println!("api_key = (set)");
            } else {
                println!("api_key = (none)");
            }
            println!("voice = {}", config.defaults.voice);
            println!("model = {}", config.defaults.model);
            println!("format = {}", config.defaults.format);
            println!("speed = {}", config.defaults.speed);
        }
        ConfigAction::SetApiKey { key } => {
            config.api_key = Some(key.trim().to_string());
            config.save()?;
            println!("API key saved");
        }
        ConfigAction::SetVoice { voice } => {
            config.defaults.voice = *voice;
            config.save()?;
            println!("Default voice set to: {}", voice);
        }
        ConfigAction::SetModel { model } => {
            config.defaults.model = *model;
            config.save()?;
            println!("Default model set to: {}", model);
        }
        ConfigAction::SetFormat { format } => {
            config.defaults.format = *format;
            config.save()?;
            println!("Default format set to: {}", format);
        }
        ConfigAction::SetSpeed { speed } => {
            config.defaults.speed = *speed;
            config.save()?;
            println!("Default speed set to: {}", speed);
        }
    }
    Ok(())
}
