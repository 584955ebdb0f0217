use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};

use crate::camera::FrameSource;
use crate::consts::{
    HYBRID_TICK_PERIOD, OCR_ONLY_TICK_PERIOD, ROI_HEIGHT_FRACTION, ROI_WIDTH_FRACTION,
    SCAN_COOLDOWN,
};
use crate::decode::DecodeCascade;
use crate::dedup::DuplicateGuard;
use crate::error::ScanError;
use crate::ident::{normalize, NormalizedId};
use crate::lookup::{AudioAsset, AudioLookup, LookupResult};
use crate::sampler::{FrameSampler, RoiFractions};

/// Receives the resolved asset once, immediately after a successful lookup.
/// The scan gesture authorizes a best-effort playback start and nothing
/// more: a sink failure is logged and never changes the outcome.
pub trait PlaybackSink: Send {
    fn begin(&self, asset: &AudioAsset) -> anyhow::Result<()>;
}

/// Sink used when no presenter is attached.
pub struct NoPlayback;

impl PlaybackSink for NoPlayback {
    fn begin(&self, _asset: &AudioAsset) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Tunables for one session. `default` is the QR-first cascade;
/// [`ScanConfig::ocr_only`] matches the slower recognition-only variant.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub tick_period: Duration,
    pub roi: RoiFractions,
    pub cooldown: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tick_period: HYBRID_TICK_PERIOD,
            roi: RoiFractions {
                width: ROI_WIDTH_FRACTION,
                height: ROI_HEIGHT_FRACTION,
            },
            cooldown: SCAN_COOLDOWN,
        }
    }
}

impl ScanConfig {
    pub fn ocr_only() -> Self {
        Self {
            tick_period: OCR_ONLY_TICK_PERIOD,
            ..Self::default()
        }
    }
}

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// A code was accepted and resolved. The camera and engine were released
    /// before the lookup round-trip began.
    Resolved {
        id: NormalizedId,
        lookup: LookupResult,
    },
    /// The session was closed before any code was accepted.
    Closed,
}

/// Closes a running session from outside the scan loop.
pub struct CloseHandle(oneshot::Sender<()>);

impl CloseHandle {
    pub fn close(self) {
        let _ = self.0.send(());
    }
}

enum TickOutcome {
    Accepted(NormalizedId),
    Miss,
}

/// One scanner activation: exclusive owner of the camera stream and the
/// recognition engine from open to close.
///
/// At most one session may be live per client context; callers must close a
/// previous session before starting the next. Every exit path (explicit
/// close, accepted code, drop) releases the camera and then terminates the
/// engine, exactly once.
pub struct ScanSession {
    camera: Box<dyn FrameSource>,
    sampler: FrameSampler,
    cascade: DecodeCascade,
    guard: DuplicateGuard,
    lookup: Box<dyn AudioLookup>,
    playback: Box<dyn PlaybackSink>,
    config: ScanConfig,
    close_rx: Option<oneshot::Receiver<()>>,
    released: bool,
}

impl ScanSession {
    pub fn new(
        camera: Box<dyn FrameSource>,
        cascade: DecodeCascade,
        lookup: Box<dyn AudioLookup>,
        playback: Box<dyn PlaybackSink>,
        config: ScanConfig,
    ) -> (Self, CloseHandle) {
        let (close_tx, close_rx) = oneshot::channel();
        let session = Self {
            camera,
            sampler: FrameSampler::new(config.roi),
            cascade,
            guard: DuplicateGuard::new(config.cooldown),
            lookup,
            playback,
            config,
            close_rx: Some(close_rx),
            released: false,
        };
        (session, CloseHandle(close_tx))
    }

    /// Drive the scan loop until a code is accepted or the handle closes.
    ///
    /// One tick runs capture, crop, and decode to completion before the
    /// next tick can fire; ticks that elapse meanwhile are coalesced and
    /// skipped, never queued, so at most one decode is in flight at any
    /// time. The close signal is checked ahead of the timer, so no new tick
    /// starts once teardown has been requested.
    pub async fn run(mut self) -> Result<SessionOutcome, ScanError> {
        let mut ticker = interval(self.config.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut close_rx = self
            .close_rx
            .take()
            .expect("a session can only be run once");

        let mut ticks = 0u64;
        let mut misses = 0u64;

        let outcome = loop {
            tokio::select! {
                biased;

                _ = &mut close_rx => {
                    info!(
                        "Scan session closed before a code was accepted ({} ticks, {} misses)",
                        ticks, misses
                    );
                    break SessionOutcome::Closed;
                }
                _ = ticker.tick() => {
                    ticks += 1;
                    match self.tick() {
                        TickOutcome::Accepted(id) => {
                            // One-shot: the sampler loop stops and the camera
                            // is released before the lookup round-trip.
                            self.release();
                            let lookup = self.lookup.resolve(&id).await;
                            if let LookupResult::Found(asset) = &lookup {
                                if let Err(e) = self.playback.begin(asset) {
                                    warn!(
                                        "Playback did not start (resume manually): {}",
                                        e
                                    );
                                }
                            }
                            break SessionOutcome::Resolved { id, lookup };
                        }
                        TickOutcome::Miss => misses += 1,
                    }
                }
            }
        };

        self.release();
        Ok(outcome)
    }

    fn tick(&mut self) -> TickOutcome {
        let frame = match self.camera.grab() {
            Ok(frame) => frame,
            Err(e) => {
                // Source not ready or a transient capture hiccup; same as an
                // empty frame.
                debug!("Frame grab failed: {}", e);
                return TickOutcome::Miss;
            }
        };

        // Capture, crop, and decode are strictly sequential within the tick.
        // The decode runs under block_in_place so a slow recognition pass
        // does not starve the runtime.
        let roi = self.sampler.sample(&frame);
        let attempt = tokio::task::block_in_place(|| self.cascade.attempt(roi));

        let Some(candidate) = attempt.candidate() else {
            return TickOutcome::Miss;
        };

        let Some(id) = normalize(&candidate.raw_text) else {
            debug!(
                "Candidate had no alphanumeric content: {:?}",
                candidate.raw_text
            );
            return TickOutcome::Miss;
        };

        // Check-and-record in one synchronous call; no await sits between
        // the decode and this decision.
        if !self.guard.accept(&id) {
            debug!("Duplicate scan suppressed: {}", id);
            return TickOutcome::Miss;
        }

        info!("Scan code accepted ({:?}): {}", candidate.source, id);
        TickOutcome::Accepted(id)
    }

    /// Release owned resources: camera stream first, then the recognition
    /// engine. Later calls no-op, so the accepted-code path, an explicit
    /// close and the final drop can all pass through here safely.
    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.camera.close();
        self.cascade.shutdown();
        info!("Scan session resources released");
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.release();
    }
}
