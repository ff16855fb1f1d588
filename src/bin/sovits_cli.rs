//! sovits-cli — synthesize speech or switch models on a GPT-SoVITS api_v2 server
//!
//! Usage:
//!   sovits-cli synth --voice <voice.yaml> --text <text> [--out <file>] [--config <cfg.yaml>]
//!   sovits-cli switch --gpt <weights> --sovits <weights> [--config <cfg.yaml>]

use anyhow::{bail, Context};
use sovits_client::{
    HttpBackend, ModelSelection, ModelSwitchSerializer, SovitsConfig, VoiceConfig,
    VoiceSynthesizer,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "synth" => cmd_synth(&args[2..]).await,
        "switch" => cmd_switch(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"sovits-cli — GPT-SoVITS api_v2 client

USAGE:
    sovits-cli <COMMAND> [OPTIONS]

COMMANDS:
    synth --voice <file> --text <text> [--out <file>] [--tag <tag>]
                                Synthesize text with the voice described in a YAML file
    switch --gpt <weights> --sovits <weights>
                                Load a model pair on the server
    version                     Show version information
    help                        Show this help message

OPTIONS:
    --config <file>             Connection settings (YAML)

ENVIRONMENT:
    SOVITS_BASE_URL             Server base URL (default http://127.0.0.1:9880)
    SOVITS_TIMEOUT_SECS         HTTP timeout, 0 disables it
    RUST_LOG                    Log filter (default info)"#
    );
}

fn cmd_version() {
    println!("sovits-cli {}", env!("CARGO_PKG_VERSION"));
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn load_config(args: &[String]) -> anyhow::Result<SovitsConfig> {
    let cfg = match flag(args, "--config") {
        Some(path) => SovitsConfig::from_yaml_file(path)?,
        None => SovitsConfig::default(),
    };
    Ok(cfg.with_env_overrides()?)
}

async fn cmd_synth(args: &[String]) -> anyhow::Result<()> {
    let Some(voice_path) = flag(args, "--voice") else {
        bail!("synth requires --voice <file>");
    };
    let Some(text) = flag(args, "--text") else {
        bail!("synth requires --text <text>");
    };
    let tag = flag(args, "--tag").unwrap_or("cli");

    let raw = std::fs::read_to_string(voice_path)
        .with_context(|| format!("reading voice file {voice_path}"))?;
    let voice: VoiceConfig =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing voice file {voice_path}"))?;

    let synth = VoiceSynthesizer::from_config(load_config(args)?)?;
    let handle = synth.generate(&voice, text, tag).await?;
    let clip = synth
        .audio(&handle)
        .context("generated clip missing from store")?;

    let out = flag(args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{tag}.{}", clip.format.extension())));
    clip.save_to(&out).await?;
    synth.release(&handle);

    println!("wrote {} bytes ({}) to {}", clip.len(), clip.mime_type(), out.display());
    Ok(())
}

async fn cmd_switch(args: &[String]) -> anyhow::Result<()> {
    let (Some(gpt), Some(sovits)) = (flag(args, "--gpt"), flag(args, "--sovits")) else {
        bail!("switch requires --gpt <weights> and --sovits <weights>");
    };
    let backend = HttpBackend::builder().config(load_config(args)?).build()?;
    let queue = ModelSwitchSerializer::new(Arc::new(backend))?;
    queue.switch(ModelSelection::new(gpt, sovits)).await?;
    println!("switched to gpt={gpt} sovits={sovits}");
    Ok(())
}
