//! Telar CLI - render built-in demo patches offline to WAV.

mod demos;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use telar_core::AudioConfig;
use telar_io::{OfflineRenderer, WavSpec, write_wav, write_wav_stereo};

#[derive(Parser)]
#[command(name = "telar")]
#[command(author, version, about = "Telar synthesis framework CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a demo patch to a WAV file
    Render(RenderArgs),

    /// List the available demo patches
    Demos,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Demo {
    /// Metronome-driven polyphonic chord arpeggio
    Poly,
    /// Granular sine cloud with jittered onsets
    Grains,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Which demo patch to render
    #[arg(long, value_enum, default_value = "poly")]
    demo: Demo,

    /// Length of the render in seconds
    #[arg(long, default_value_t = 4.0)]
    seconds: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 44_100.0)]
    sample_rate: f32,

    /// Samples per processing block
    #[arg(long, default_value_t = 128)]
    block_size: usize,

    /// Output WAV path
    #[arg(long, default_value = "telar.wav")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => render(&args),
        Commands::Demos => {
            println!("poly    metronome-driven polyphonic chord arpeggio");
            println!("grains  granular sine cloud with jittered onsets");
            Ok(())
        }
    }
}

fn render(args: &RenderArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.seconds > 0.0, "--seconds must be positive");
    anyhow::ensure!(args.block_size > 0, "--block-size must be positive");

    let config = AudioConfig::new(args.sample_rate, args.block_size);
    let patch = match args.demo {
        Demo::Poly => demos::poly_demo(&config)?,
        Demo::Grains => demos::grains_demo(&config)?,
    };

    tracing::info!(demo = ?args.demo, seconds = args.seconds, "rendering");
    let mut renderer = OfflineRenderer::new(patch, config);
    let channels = renderer.render_secs(args.seconds);

    let spec = WavSpec {
        sample_rate: args.sample_rate as u32,
        ..WavSpec::default()
    };
    match channels.as_slice() {
        [mono] => write_wav(&args.out, mono, spec)?,
        [left, right, ..] => write_wav_stereo(&args.out, left, right, spec)?,
        [] => anyhow::bail!("demo patch has no outputs"),
    }

    println!(
        "wrote {} ({} channels, {:.2}s at {} Hz)",
        args.out.display(),
        channels.len().min(2),
        channels[0].len() as f32 / args.sample_rate,
        args.sample_rate
    );
    Ok(())
}
