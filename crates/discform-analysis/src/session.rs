//! Per-run analysis state.
//!
//! An [`AnalysisSession`] consumes frames in timestamp order, updating the
//! event slots and form-error log as it goes. [`AnalysisSession::finalize`]
//! computes the sequence-level metrics and score without touching that state,
//! so it can be called on a prefix and called again later.

use discform_core::{AnalysisConfig, Error, Frame, Result};

use crate::events::{EventSlots, FrameContext};
use crate::form_errors::{FormErrorClassifier, FormErrorLog};
use crate::metrics::{HeadlineMetrics, SupplementaryMetrics};
use crate::scorer::{AnalysisOutcome, AnalysisResult};

/// State for analyzing one recorded throw
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    config: AnalysisConfig,
    /// Length of the recording in seconds
    duration: f64,
    /// Frames with at least one usable keypoint
    frames: Vec<Frame>,
    frames_skipped: usize,
    last_timestamp: Option<f64>,
    events: EventSlots,
    errors: FormErrorClassifier,
}

impl AnalysisSession {
    pub fn new(config: AnalysisConfig, duration: f64) -> Result<Self> {
        config.validate()?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(Error::InvalidDuration(duration));
        }

        Ok(Self {
            config,
            duration,
            frames: Vec::new(),
            frames_skipped: 0,
            last_timestamp: None,
            events: EventSlots::new(),
            errors: FormErrorClassifier::new(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Accepted frames with usable keypoints
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames_skipped(&self) -> usize {
        self.frames_skipped
    }

    /// Live event slots, before any end-of-sequence checks
    pub fn events(&self) -> &EventSlots {
        &self.events
    }

    /// Live form-error log, before any end-of-sequence checks
    pub fn form_errors(&self) -> &FormErrorLog {
        self.errors.log()
    }

    /// Feed the next frame.
    ///
    /// Rejected frames leave the session unchanged.
    pub fn process_frame(&mut self, frame: Frame) -> Result<()> {
        let timestamp = frame.timestamp;
        if !timestamp.is_finite() {
            tracing::warn!("Rejecting frame with non-finite timestamp");
            return Err(Error::NonFiniteTimestamp);
        }
        if let Some(previous) = self.last_timestamp {
            if timestamp <= previous {
                tracing::warn!("Rejecting frame at {:.3}s: previous was {:.3}s", timestamp, previous);
                return Err(Error::OutOfOrder {
                    previous,
                    current: timestamp,
                });
            }
        }
        if self.frames.len() + self.frames_skipped >= self.config.max_frames {
            tracing::warn!("Rejecting frame at {:.3}s: frame limit reached", timestamp);
            return Err(Error::FrameLimit {
                max: self.config.max_frames,
            });
        }

        self.last_timestamp = Some(timestamp);

        if frame.usable_count(self.config.confidence_gate) == 0 {
            tracing::debug!("Skipping frame at {:.3}s: no usable keypoints", timestamp);
            self.frames_skipped += 1;
            return Ok(());
        }

        let ctx = FrameContext::new(
            &frame,
            self.frames.last(),
            self.frames.len(),
            self.duration,
            &self.config,
        );
        self.events.observe(&ctx, &self.config);
        self.errors.observe(&ctx, &self.config);

        self.frames.push(frame);
        Ok(())
    }

    /// Score everything seen so far
    pub fn finalize(&self) -> AnalysisOutcome {
        if self.frames.is_empty() {
            tracing::info!(
                "No detectable body in sequence ({} frames skipped)",
                self.frames_skipped
            );
            return AnalysisOutcome::Undetectable {
                frames_skipped: self.frames_skipped,
            };
        }

        let metrics = HeadlineMetrics::from_frames(&self.frames, &self.config);
        let supplementary = SupplementaryMetrics::from_frames(&self.frames, &self.config);

        let events = if self.config.revalidate_event_chain {
            self.events.revalidated(&self.config.events)
        } else {
            self.events.clone()
        };
        let errors = self.errors.finalized_log(&self.config);

        let result = AnalysisResult::build(
            metrics,
            supplementary,
            &events,
            &errors,
            self.frames.len(),
            self.frames_skipped,
            &self.config,
        );

        tracing::info!(
            "Analyzed {} frames: score {}, {} events, {} issues",
            result.frames_analyzed,
            result.overall_score,
            events.filled(),
            result.total_issue_count
        );

        AnalysisOutcome::Analyzed(Box::new(result))
    }

    /// Discard all frames and results, keeping configuration and duration
    pub fn reset(&mut self) {
        tracing::info!("Resetting session after {} frames", self.frames.len());
        self.frames = Vec::new();
        self.frames_skipped = 0;
        self.last_timestamp = None;
        self.events.clear();
        self.errors.clear();
    }
}

/// Analyze a complete, ordered frame sequence in one call.
///
/// Duration is the last frame's timestamp, or one second when that is not positive.
pub fn analyze_sequence(config: &AnalysisConfig, frames: &[Frame]) -> Result<AnalysisOutcome> {
    let duration = frames
        .last()
        .map(|f| f.timestamp)
        .filter(|t| t.is_finite() && *t > 0.0)
        .unwrap_or(1.0);

    let mut session = AnalysisSession::new(config.clone(), duration)?;
    for frame in frames {
        session.process_frame(frame.clone())?;
    }

    Ok(session.finalize())
}
