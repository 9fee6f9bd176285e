use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::LocalizerConfig;
use crate::detection::{field, localize_balls};
use crate::error::Result;
use crate::models::{BallsLocalization, FieldLocalization, FrameLocalization, Mask};

/// Receives the intermediate images of a localization run.
///
/// Implementations must not fail the run: problems are theirs to report.
pub trait DebugSink: Send + Sync {
    fn mask(&self, step: &str, mask: &Mask);

    fn frame(&self, step: &str, frame: &RgbImage);
}

/// Sink that drops everything.
pub struct NoDebug;

impl DebugSink for NoDebug {
    fn mask(&self, _step: &str, _mask: &Mask) {}

    fn frame(&self, _step: &str, _frame: &RgbImage) {}
}

/// Writes every intermediate image as `NN_step.png` into one directory,
/// numbered in the order the steps report them.
pub struct DebugDir {
    output_dir: PathBuf,
    counter: AtomicUsize,
}

impl DebugDir {
    /// The directory must be empty or non-existent.
    pub fn new(output_dir: PathBuf) -> anyhow::Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self {
            output_dir,
            counter: AtomicUsize::new(0),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn next_path(&self, step: &str) -> PathBuf {
        let index = self.counter.fetch_add(1, Ordering::SeqCst);
        let filename = format!("{:02}_{}.png", index, step.to_lowercase().replace(' ', "_"));
        self.output_dir.join(filename)
    }
}

impl DebugSink for DebugDir {
    fn mask(&self, step: &str, mask: &Mask) {
        let path = self.next_path(step);
        match mask.save(&path) {
            Ok(()) => log::debug!("saved {}", path.display()),
            Err(e) => log::warn!("Failed to save debug image {}: {}", path.display(), e),
        }
    }

    fn frame(&self, step: &str, frame: &RgbImage) {
        let path = self.next_path(step);
        match frame.save(&path) {
            Ok(()) => log::debug!("saved {}", path.display()),
            Err(e) => log::warn!("Failed to save debug image {}: {}", path.display(), e),
        }
    }
}

/// Field and ball localizer for single frames.
///
/// Holds no per-frame state, so one instance can serve many frames and
/// threads.
pub struct Localizer {
    config: LocalizerConfig,
    sink: Arc<dyn DebugSink>,
}

impl Localizer {
    pub fn new(config: LocalizerConfig) -> Self {
        Self {
            config,
            sink: Arc::new(NoDebug),
        }
    }

    /// Save every intermediate image into `output_dir`, which must be empty
    /// or non-existent.
    pub fn with_debug(self, output_dir: PathBuf) -> anyhow::Result<Self> {
        let sink = DebugDir::new(output_dir)?;
        Ok(self.with_sink(Arc::new(sink)))
    }

    pub fn with_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &LocalizerConfig {
        &self.config
    }

    pub fn localize_field(&self, frame: &RgbImage) -> Result<FieldLocalization> {
        field::localize_field(frame, &self.config.field, self.sink.as_ref())
    }

    pub fn localize_balls(&self, frame: &RgbImage, field: &FieldLocalization) -> Result<BallsLocalization> {
        localize_balls(frame, field, &self.config, self.sink.as_ref())
    }

    /// Localize the field, then the balls on it.
    pub fn localize(&self, frame: &RgbImage) -> Result<FrameLocalization> {
        self.sink.frame("input", frame);

        let field = self.localize_field(frame)?;
        log::info!(
            "Field: {} pockets, {} rail lines",
            field.holes.len(),
            field.lines.len()
        );

        let balls = self.localize_balls(frame, &field)?;
        log::info!(
            "Balls: {} total, {} solids, {} stripes, eight-ball {}",
            balls.ball_count(),
            balls.solids.len(),
            balls.stripes.len(),
            if balls.black.is_some() { "found" } else { "missing" }
        );

        Ok(FrameLocalization { field, balls })
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(LocalizerConfig::default())
    }
}
