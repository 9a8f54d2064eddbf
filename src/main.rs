use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hearth_assistant::tools::{register_builtins, ToolRegistry};
use hearth_assistant::voice::{AudioCapture, AudioPlayback};
use hearth_assistant::{Config, Daemon};

/// Hearth - local voice assistant
#[derive(Parser)]
#[command(name = "hearth", version, about)]
struct Cli {
    /// Path to configuration file (defaults to the platform config dir)
    #[arg(short, long, env = "HEARTH_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// List registered tools and their aliases
    ListTools,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,hearth_assistant=info",
        1 => "info,hearth_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(&config, duration).await,
            Command::TestSpeaker => test_speaker(),
            Command::ListTools => list_tools(),
        };
    }

    tracing::info!(wakeword = %config.wakeword, "starting hearth");
    Daemon::new(config).run().await?;

    Ok(())
}

/// Test microphone input
async fn test_mic(config: &Config, duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new(config.audio.sample_rate)?;
    capture.start()?;

    println!("Sample rate: {} Hz", capture.sample_rate());
    println!("Silence threshold: {:.4}", config.audio.silence_threshold);
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = calculate_rms(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
        let speaking = if energy >= config.audio.silence_threshold {
            "SPEECH"
        } else {
            "silence"
        };

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | {:7} | [{}]",
            i + 1,
            energy,
            peak,
            speaking,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw SPEECH while talking, segmentation will work.");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Calculate RMS energy
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let mut playback = AudioPlayback::new()?;

    // Generate 2 seconds of 440Hz sine wave at 24kHz sample rate
    let sample_rate = 24_000_i32;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);
    playback.play(samples)?;

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If not, check: pactl info | grep 'Default Sink'");

    Ok(())
}

/// List registered tools and their aliases
fn list_tools() -> anyhow::Result<()> {
    let mut registry = ToolRegistry::new();
    register_builtins(&mut registry)?;

    for tool in registry.schema() {
        let descriptor = registry.resolve(&tool.name)?;
        println!("{}", tool.name);
        println!("  {}", tool.description);
        if !descriptor.aliases.is_empty() {
            println!("  aliases: {}", descriptor.aliases.join(", "));
        }
        for param in &tool.parameters {
            let required = if param.required { "required" } else { "optional" };
            println!(
                "  param: {} ({:?}, {required}) - {}",
                param.name, param.kind, param.description
            );
        }
        println!();
    }

    Ok(())
}
