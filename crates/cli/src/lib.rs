//! Engagement Pivot command-line driver
//!
//! Runs a recorded session (a directory of still frames) through the
//! engagement engine and builds the session report.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use engagement::overlay::annotate;
use engagement::{
    EngagementConfig, EngagementEngine, EngagementError, SessionRecord, SessionReport, SummaryStats,
};
use image::ImageFormat;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use video_frame::{FrameError, FrameSampler, ImageSequence, VideoFrame};

/// Decoded frames buffered between the reader and the engine
const FRAME_QUEUE_DEPTH: usize = 8;

/// Install the global tracing subscriber (logs go to stderr)
pub fn init_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}

/// Load configuration from an optional file plus `PIVOT__*` overrides
pub fn load_config(path: Option<&Path>) -> Result<EngagementConfig> {
    EngagementConfig::load(path).context("loading configuration")
}

/// Build the engine, optionally degrading to no detector when models are missing
pub fn build_engine(config: EngagementConfig, allow_no_detector: bool) -> Result<EngagementEngine> {
    match EngagementEngine::from_config(config.clone()) {
        Ok(engine) => Ok(engine),
        Err(EngagementError::DetectorUnavailable(reason)) if allow_no_detector => {
            warn!("Detector unavailable ({}), continuing without it", reason);
            EngagementEngine::without_detector(config).context("initialising engagement engine")
        }
        Err(e) => Err(e).context("initialising engagement engine"),
    }
}

/// Result of analysing a recording
#[derive(Debug, Serialize)]
pub struct AnalysisOutput {
    pub frames_seen: u64,
    pub frames_analyzed: usize,
    pub fps: f64,
    pub detector_ready: bool,
    /// `None` when no frame was analysed
    pub report: Option<SessionReport>,
    /// Rolling-window statistics at the end of the recording
    pub summary: SummaryStats,
}

/// Analyse every sampled frame of `sequence`.
///
/// Frames are decoded on a blocking thread and queued to this task, which is
/// the only owner of `engine`. Frames that fail to decode are skipped.
pub async fn run_analysis(
    mut engine: EngagementEngine,
    sequence: ImageSequence,
    annotate_dir: Option<PathBuf>,
) -> Result<AnalysisOutput> {
    if let Some(dir) = &annotate_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let fps = sequence.fps();
    let skip = engine.config().frame_skip;
    info!(
        frames = sequence.len(),
        fps,
        duration_s = sequence.duration_s(),
        skip,
        "Analysing recording"
    );

    let (tx, mut rx) = mpsc::channel::<(u64, Result<VideoFrame, FrameError>)>(FRAME_QUEUE_DEPTH);
    let reader = tokio::task::spawn_blocking(move || {
        let mut sampler = FrameSampler::new(skip);
        for position in 0..sequence.len() {
            let Some(frame_idx) = sampler.tick() else {
                continue;
            };
            let decoded = sequence.decode(position);
            if tx.blocking_send((frame_idx, decoded)).is_err() {
                debug!("Frame queue closed, stopping reader");
                break;
            }
        }
        sampler.frames_seen()
    });

    let mut records = Vec::new();
    while let Some((frame_idx, decoded)) = rx.recv().await {
        let frame = match decoded {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping frame {}: {}", frame_idx, e);
                continue;
            }
        };

        let result = match engine.analyze_frame(&frame) {
            Ok(result) => result,
            Err(EngagementError::InvalidFrame(e)) => {
                warn!("Skipping frame {}: {}", frame_idx, e);
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("analysing frame {}", frame_idx)),
        };

        if let Some(dir) = &annotate_dir {
            let path = dir.join(format!("frame_{:06}.png", frame_idx));
            annotate(&frame, &result)
                .save_with_format(&path, ImageFormat::Png)
                .with_context(|| format!("writing {}", path.display()))?;
        }

        records.push(SessionRecord::from_result(frame_idx, fps, &result));
    }

    let frames_seen = reader.await.context("frame reader task failed")?;
    let report = SessionReport::build(&records, engine.selector());
    match &report {
        Some(r) => info!(
            frames = r.frames_analyzed,
            avg = r.avg_score,
            min = r.min_score,
            alerts = r.alerts.len(),
            "Analysis complete"
        ),
        None => warn!("No frames were analysed"),
    }

    Ok(AnalysisOutput {
        frames_seen,
        frames_analyzed: records.len(),
        fps,
        detector_ready: engine.detector_ready(),
        report,
        summary: engine.summary_stats(),
    })
}
