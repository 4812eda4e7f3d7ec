//! emosense-ui - interactive emotion-analysis client entry point
//!
//! Terminal front-end over the controller: select a WAV file, submit it to
//! the classification service, inspect the result, and play the original
//! or any segment clip (one at a time).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emosense_ui::client::EmotionClient;
use emosense_ui::controller::{media_type_for_path, CandidateFile, Controller};
use emosense_ui::playback::RodioPlaybackSink;
use emosense_ui::view;

/// Command-line arguments for emosense-ui
#[derive(Parser, Debug)]
#[command(name = "emosense-ui")]
#[command(about = "Interactive client for the emotion-classification service")]
#[command(version)]
struct Args {
    /// WAV file to select on startup
    file: Option<PathBuf>,

    /// Inference service origin (falls back to environment, config file,
    /// then the compiled default)
    #[arg(short, long)]
    service: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emosense_ui=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let service_url = emosense_common::config::resolve_service_url(args.service.as_deref());
    info!("Inference service: {}", service_url);

    let client = EmotionClient::new(service_url).context("Failed to create HTTP client")?;
    let sink = RodioPlaybackSink::new(reqwest::Client::new());
    let (mut controller, mut events) = Controller::new(client, Box::new(sink));

    if let Some(path) = &args.file {
        if let Err(e) = select_from_path(&mut controller, path).await {
            eprintln!("{}", e);
        }
    }

    print_frame(&controller);
    print_help();

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => {
                        controller.handle_playback_event(event);
                        print_frame(&controller);
                    }
                    None => break,
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                if !run_command(&mut controller, line.trim()).await {
                    break;
                }
                print_frame(&controller);
            }
        }
    }

    info!("Exiting");
    Ok(())
}

/// Apply one command line; returns false when the user asked to quit
async fn run_command(controller: &mut Controller, line: &str) -> bool {
    let (command, argument) = match line.split_once(' ') {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "open" => {
            if argument.is_empty() {
                eprintln!("usage: open <path.wav>");
            } else if let Err(e) = select_from_path(controller, Path::new(argument)).await {
                eprintln!("{}", e);
            }
        }
        "analyze" => {
            controller.submit().await;
        }
        "play" => {
            if let Some(path) = playback_target(controller, argument) {
                controller.toggle_playback(&path).await;
            }
        }
        "help" => print_help(),
        "quit" | "exit" => return false,
        other => eprintln!("unknown command: {} (try: help)", other),
    }
    true
}

/// Load a file from disk and hand it to the controller as a candidate
async fn select_from_path(controller: &mut Controller, path: &Path) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.wav")
        .to_string();
    let media_type = media_type_for_path(path).to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    controller.select_file(CandidateFile {
        name,
        media_type,
        bytes,
    });
    Ok(())
}

/// Resolve a `play` argument to a result file path.
///
/// No argument toggles the original audio; a number toggles that segment
/// (1-based, matching the rendered list).
fn playback_target(controller: &Controller, argument: &str) -> Option<String> {
    let result = match controller.result() {
        Some(result) => result,
        None => {
            eprintln!("no analysis result yet (use: analyze)");
            return None;
        }
    };

    if argument.is_empty() {
        return Some(result.original_file_path.clone());
    }

    match argument.parse::<usize>() {
        Ok(index) if index >= 1 && index <= result.predictions_details.len() => {
            Some(result.predictions_details[index - 1].file_path.clone())
        }
        _ => {
            eprintln!(
                "usage: play [1..{}]",
                result.predictions_details.len().max(1)
            );
            None
        }
    }
}

fn print_frame(controller: &Controller) {
    let frame = view::render(&view::project(controller));
    println!("\n{}", frame);
}

fn print_help() {
    println!("commands: open <path.wav> | analyze | play [n] | help | quit");
}
