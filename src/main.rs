use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};
use tokio::signal;

use echoframe::camera::NokhwaCamera;
use echoframe::decode::qr::{QrDecoder, RqrrDecoder};
use echoframe::decode::tesseract_ocr::TesseractOcrEngine;
use echoframe::decode::{DecodeCascade, OcrEngine};
use echoframe::lookup::{lookup_manual, AudioAsset, HttpAudioLookup, LookupResult};
use echoframe::session::{NoPlayback, PlaybackSink, ScanConfig, ScanSession, SessionOutcome};

/// Echoframe scanner - recover the voice message linked to a frame's printed code
#[derive(Parser, Debug)]
#[command(name = "echoframe")]
#[command(about = "Scan an audio frame's code and play back the linked message", long_about = None)]
struct Args {
    /// Base URL of the storefront API
    #[arg(short = 'u', long, default_value = "http://localhost:8000")]
    api_url: String,

    /// Camera device index
    #[arg(short = 'd', long, default_value = "0")]
    camera_index: u32,

    /// Decode mode: "hybrid" (QR with OCR fallback), "qr", or "ocr"
    #[arg(short = 'm', long, default_value = "hybrid", value_parser = ["hybrid", "qr", "ocr"])]
    mode: String,

    /// Scan tick period in milliseconds (0 = mode default)
    #[arg(short = 't', long, default_value = "0")]
    tick_ms: u64,

    /// Look up a code printed on the frame instead of scanning
    #[arg(short = 'c', long)]
    code: Option<String>,

    /// Do not hand the resolved audio URL to the system player
    #[arg(long, default_value = "false")]
    no_autoplay: bool,
}

/// Hands the audio URL to the OS so the default player takes over.
struct SystemPlayback;

impl PlaybackSink for SystemPlayback {
    fn begin(&self, asset: &AudioAsset) -> Result<()> {
        open::that(&asset.audio_url)?;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter(None, log::LevelFilter::Info)
        .filter(Some("echoframe"), log::LevelFilter::Debug)
        .init();

    let args = Args::parse();
    let lookup = HttpAudioLookup::new(args.api_url.clone());

    // Manual-entry fallback: the typed code takes the exact normalization
    // and resolution path a camera decode takes.
    if let Some(raw) = &args.code {
        return match lookup_manual(raw, &lookup).await {
            Some((id, result)) => {
                report(id.as_str(), &result, !args.no_autoplay);
                Ok(())
            }
            None => anyhow::bail!("Please enter a valid ID"),
        };
    }

    let qr: Option<Box<dyn QrDecoder>> = match args.mode.as_str() {
        "ocr" => None,
        _ => Some(Box::new(RqrrDecoder)),
    };
    // In "qr" mode the engine is skipped and the cascade degrades to the
    // matrix stage alone; in the other modes a failed engine load is fatal.
    let ocr: Option<Box<dyn OcrEngine>> = match args.mode.as_str() {
        "qr" => None,
        _ => Some(Box::new(TesseractOcrEngine::new()?)),
    };

    let mut config = if args.mode == "ocr" {
        ScanConfig::ocr_only()
    } else {
        ScanConfig::default()
    };
    if args.tick_ms > 0 {
        config.tick_period = Duration::from_millis(args.tick_ms);
    }

    let camera = NokhwaCamera::open(args.camera_index)?;
    let cascade = DecodeCascade::new(qr, ocr);
    let playback: Box<dyn PlaybackSink> = if args.no_autoplay {
        Box::new(NoPlayback)
    } else {
        Box::new(SystemPlayback)
    };

    let (session, close) = ScanSession::new(
        Box::new(camera),
        cascade,
        Box::new(lookup),
        playback,
        config,
    );

    info!("Point the camera at the code printed on the frame (Ctrl-C to quit)");

    tokio::select! {
        outcome = session.run() => match outcome? {
            SessionOutcome::Resolved { id, lookup } => {
                // Playback was already handed off by the session sink.
                report(id.as_str(), &lookup, false);
            }
            SessionOutcome::Closed => info!("Scanner closed"),
        },
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => {
                    info!("Received Ctrl-C, shutting down gracefully...");
                    close.close();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        }
    }

    Ok(())
}

fn report(id: &str, result: &LookupResult, autoplay: bool) {
    match result {
        LookupResult::Found(asset) => {
            info!(
                "Frame found for {}: {}",
                id,
                asset.frame_title.as_deref().unwrap_or("audio frame")
            );
            if let Some(name) = &asset.customer_name {
                info!("  recorded for: {}", name);
            }
            if let Some(created) = &asset.created_at {
                info!("  created: {}", created);
            }
            info!("  audio: {}", asset.audio_url);
            if autoplay {
                if let Err(e) = SystemPlayback.begin(asset) {
                    warn!("Playback did not start (open the URL manually): {}", e);
                }
            }
        }
        LookupResult::NotFound => warn!("ID {} not found. Please check and try again.", id),
        LookupResult::NetworkError => warn!("Failed to look up audio. Please try again."),
    }
}
