// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Kantwerk — Real-time document boundary detection.
//
// Demo binary. Runs the detection pipeline over a single image or replays a
// directory of frames through the worker, writing overlay renderings.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};

use kantwerk_capture::{DetectionWorker, DirectorySource, FrameSource};
use kantwerk_core::config::DetectConfig;
use kantwerk_core::error::{KantwerkError, Result};
use kantwerk_core::types::{DetectionResult, DocumentKind, Frame, PixelFormat};
use kantwerk_detect::Detector;
use kantwerk_overlay::{OverlayRenderer, OverlayStyle};

#[derive(Parser, Debug)]
#[command(author, version, about = "Document boundary detection for camera previews")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the document boundary in a single image.
    Detect {
        /// Input image (png, jpg, bmp).
        image: PathBuf,
        /// Detection profile JSON; built-in defaults apply when omitted.
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Document kind for the alignment guide.
        #[arg(long, value_enum, default_value_t = KindArg::A4)]
        kind: KindArg,
        /// Where to write the overlay rendering.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replay a directory of frames through the detection worker.
    Stream {
        /// Directory of image files, replayed in name order.
        dir: PathBuf,
        /// Replay pace in frames per second.
        #[arg(long, default_value_t = 30)]
        fps: u32,
        /// Detection profile JSON; built-in defaults apply when omitted.
        #[arg(long)]
        profile: Option<PathBuf>,
    },
}

/// Document kinds selectable on the command line.
#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    A4,
    Rg,
    Cpf,
    Cnh,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::A4 => DocumentKind::A4,
            KindArg::Rg => DocumentKind::Rg,
            KindArg::Cpf => DocumentKind::Cpf,
            KindArg::Cnh => DocumentKind::Cnh,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(error) = run() {
        tracing::error!(error = %error, "kantwerk failed");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Detect {
            image,
            profile,
            kind,
            output,
        } => run_detect(&image, profile.as_deref(), kind.into(), output.as_deref()),
        Command::Stream { dir, fps, profile } => run_stream(&dir, fps, profile.as_deref()),
    }
}

/// Build the detection configuration, from a JSON profile when given.
fn load_config(profile: Option<&Path>) -> Result<DetectConfig> {
    match profile {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let config = DetectConfig::from_json(&text)?;
            info!(path = %path.display(), "Detection profile loaded");
            Ok(config)
        }
        None => Ok(DetectConfig::default()),
    }
}

/// One-shot detection over a still image.
fn run_detect(
    image: &Path,
    profile: Option<&Path>,
    kind: DocumentKind,
    output: Option<&Path>,
) -> Result<()> {
    let detector = Detector::new(load_config(profile)?)?;
    let decoded = image::open(image).map_err(|err| {
        KantwerkError::Image(format!("failed to open {}: {}", image.display(), err))
    })?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let frame = Frame::new(rgba.clone().into_raw(), width, height, PixelFormat::Rgba8)?;

    let started = Instant::now();
    let polygon = detector.detect_scaled(&frame.view())?;
    let latency = started.elapsed();
    info!(
        width,
        height,
        latency_ms = latency.as_millis() as u64,
        "Frame processed"
    );

    match &polygon {
        Some(polygon) => {
            println!("document found:");
            for point in &polygon.points {
                println!("  ({:.1}, {:.1})", point.x, point.y);
            }
        }
        None => println!("no document found"),
    }

    if let Some(path) = output {
        let mut canvas = rgba;
        let renderer = OverlayRenderer::new(OverlayStyle::default());
        match &polygon {
            Some(polygon) => renderer.render(&mut canvas, polygon)?,
            None => renderer.render_guide(&mut canvas, kind)?,
        }
        canvas.save(path).map_err(|err| {
            KantwerkError::Image(format!("failed to save {}: {}", path.display(), err))
        })?;
        info!(path = %path.display(), "Overlay written");
    }
    Ok(())
}

/// Replay a frame directory through the worker at the requested pace.
fn run_stream(dir: &Path, fps: u32, profile: Option<&Path>) -> Result<()> {
    let detector = Detector::new(load_config(profile)?)?;
    let mut source = DirectorySource::new(dir)?;
    let mut worker = DetectionWorker::spawn(detector)?;
    let pace = Duration::from_secs_f32(1.0 / fps.max(1) as f32);
    info!(frames = source.frame_count(), fps, "Replay started");

    let mut last_sequence = 0u64;
    loop {
        let tick = Instant::now();
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(error) => {
                warn!(error = %error, "Skipping unreadable frame");
                continue;
            }
        };
        worker.submit(frame);

        if let Some(update) = worker.latest() {
            if update.sequence > last_sequence {
                last_sequence = update.sequence;
                match update.result {
                    DetectionResult::Document(_) => info!(
                        sequence = update.sequence,
                        latency_ms = update.latency.as_millis() as u64,
                        "Document located"
                    ),
                    DetectionResult::NoDocument => {
                        debug!(sequence = update.sequence, "No document")
                    }
                }
            }
        }

        let elapsed = tick.elapsed();
        if elapsed < pace {
            std::thread::sleep(pace - elapsed);
        }
    }

    // Let the tail of the stream finish before reading the counters.
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let stats = worker.stats();
        if stats.processed + stats.dropped == stats.submitted || Instant::now() >= deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let stats = worker.stats();
    worker.stop();
    info!(
        submitted = stats.submitted,
        processed = stats.processed,
        dropped = stats.dropped,
        failed = stats.failed,
        "Replay finished"
    );
    Ok(())
}
