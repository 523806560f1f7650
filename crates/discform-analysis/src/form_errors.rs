//! Form-error classification.
//!
//! Each processed frame is checked for the five discrete throwing faults.
//! Instances are appended to a [`FormErrorLog`]; nothing is removed until the
//! session is reset.

use discform_core::{AnalysisConfig, FormErrorThresholds};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::events::{brace_pose, hip_rotation_score, FrameContext};
use crate::features::hip_rotation_between;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormErrorKind {
    Rounding,
    NoseUp,
    AllArm,
    EarlyRelease,
    NoBrace,
}

impl FormErrorKind {
    pub const ALL: [FormErrorKind; 5] = [
        FormErrorKind::Rounding,
        FormErrorKind::NoseUp,
        FormErrorKind::AllArm,
        FormErrorKind::EarlyRelease,
        FormErrorKind::NoBrace,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FormErrorKind::Rounding => "Rounding",
            FormErrorKind::NoseUp => "Nose-up release",
            FormErrorKind::AllArm => "All-arm throw",
            FormErrorKind::EarlyRelease => "Early release",
            FormErrorKind::NoBrace => "No brace",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FormErrorKind::Rounding => {
                "The arm swings around the body instead of pulling straight through"
            }
            FormErrorKind::NoseUp => "The wrist rises above the elbow, tilting the disc nose up",
            FormErrorKind::AllArm => "The arm moves without the hips turning to drive it",
            FormErrorKind::EarlyRelease => "The arm extends forward too early in the throw",
            FormErrorKind::NoBrace => "The front leg never plants firmly during the throw",
        }
    }
}

/// What an instance records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMeasure {
    /// 0-100
    Severity(f64),
    /// Throw progress (timestamp over duration) where the error occurred
    Timing(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorInstance {
    pub timestamp: f64,
    pub measure: ErrorMeasure,
}

/// Append-only record of form-error instances, grouped by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormErrorLog {
    entries: BTreeMap<FormErrorKind, Vec<ErrorInstance>>,
}

impl FormErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: FormErrorKind, timestamp: f64, measure: ErrorMeasure) {
        tracing::debug!("{:?} at {:.3}s: {:?}", kind, timestamp, measure);
        self.entries
            .entry(kind)
            .or_default()
            .push(ErrorInstance { timestamp, measure });
    }

    pub fn instances(&self, kind: FormErrorKind) -> &[ErrorInstance] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Kinds with at least one instance
    pub fn kinds(&self) -> impl Iterator<Item = FormErrorKind> + '_ {
        self.entries
            .iter()
            .filter(|(_, instances)| !instances.is_empty())
            .map(|(kind, _)| *kind)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Mean instance severity, or the fixed severity for timing and binary kinds
    pub fn aggregate_severity(
        &self,
        kind: FormErrorKind,
        thresholds: &FormErrorThresholds,
    ) -> Option<f64> {
        let instances = self.instances(kind);
        if instances.is_empty() {
            return None;
        }

        match kind {
            FormErrorKind::EarlyRelease => Some(thresholds.early_release_severity),
            FormErrorKind::NoBrace => Some(thresholds.no_brace_severity),
            _ => {
                let severities: Vec<f64> = instances
                    .iter()
                    .filter_map(|i| match i.measure {
                        ErrorMeasure::Severity(s) => Some(s),
                        ErrorMeasure::Timing(_) => None,
                    })
                    .collect();
                if severities.is_empty() {
                    return None;
                }
                Some(severities.iter().sum::<f64>() / severities.len() as f64)
            }
        }
    }

    pub fn to_map(&self) -> BTreeMap<FormErrorKind, Vec<ErrorInstance>> {
        self.entries
            .iter()
            .filter(|(_, instances)| !instances.is_empty())
            .map(|(kind, instances)| (*kind, instances.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Per-session form-error state
#[derive(Debug, Clone, Default)]
pub struct FormErrorClassifier {
    log: FormErrorLog,
    /// Timestamp of the first frame inside the brace window
    brace_window_start: Option<f64>,
    brace_seen: bool,
}

impl FormErrorClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &FormErrorLog {
        &self.log
    }

    /// Check one frame against every classifier
    pub fn observe(&mut self, ctx: &FrameContext<'_>, config: &AnalysisConfig) {
        let t = &config.form_errors;
        let timestamp = ctx.timestamp();

        if let Some(severity) = rounding(ctx, t) {
            self.log
                .record(FormErrorKind::Rounding, timestamp, ErrorMeasure::Severity(severity));
        }
        if let Some(severity) = nose_up(ctx, t) {
            self.log
                .record(FormErrorKind::NoseUp, timestamp, ErrorMeasure::Severity(severity));
        }
        if let Some(severity) = all_arm(ctx, config) {
            self.log
                .record(FormErrorKind::AllArm, timestamp, ErrorMeasure::Severity(severity));
        }
        if is_early_release(ctx, t) {
            self.log.record(
                FormErrorKind::EarlyRelease,
                timestamp,
                ErrorMeasure::Timing(ctx.progress),
            );
        }

        if ctx.progress >= t.no_brace_progress {
            self.brace_window_start.get_or_insert(timestamp);
            if brace_pose(&ctx.pose, &config.events).is_some() {
                self.brace_seen = true;
            }
        }
    }

    /// The log with end-of-sequence judgements added; the live log is untouched
    pub fn finalized_log(&self, config: &AnalysisConfig) -> FormErrorLog {
        let mut log = self.log.clone();

        if let (Some(start), false) = (self.brace_window_start, self.brace_seen) {
            log.record(
                FormErrorKind::NoBrace,
                start,
                ErrorMeasure::Severity(config.form_errors.no_brace_severity),
            );
        }

        log
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn rounding(ctx: &FrameContext<'_>, t: &FormErrorThresholds) -> Option<f64> {
    let pose = &ctx.pose;
    let d = pose.elbow_torso_distance()?;
    let wrist_forward = pose.wrist_forward_of_shoulder()?;
    let elbow_forward = pose.elbow_forward_of_shoulder()?;
    let extension = pose.arm_extension()?;

    (d < t.rounding_max_elbow_torso
        && wrist_forward < 0.0
        && elbow_forward < t.rounding_elbow_margin
        && extension < t.rounding_max_extension)
        .then(|| 100.0 * (1.0 - d / t.rounding_max_elbow_torso))
}

fn nose_up(ctx: &FrameContext<'_>, t: &FormErrorThresholds) -> Option<f64> {
    let rise = ctx.pose.wrist_rise_over_elbow()?;
    (rise > t.nose_up_margin).then(|| (rise / (4.0 * t.nose_up_margin)).min(1.0) * 100.0)
}

fn all_arm(ctx: &FrameContext<'_>, config: &AnalysisConfig) -> Option<f64> {
    let t = &config.form_errors;
    let previous = ctx.previous.as_ref()?;
    let pose = &ctx.pose;

    let hip_score = hip_rotation_score(hip_rotation_between(previous, pose)?, config);
    let arm = pose.throwing_arm()?;
    let offset = (arm.wrist.x - arm.shoulder.x).abs();
    let width_change = (pose.hip_width()? - previous.hip_width()?).abs();

    (hip_score < t.all_arm_max_hip_score
        && offset > t.all_arm_min_wrist_offset
        && width_change < t.all_arm_max_hip_width_change)
        .then(|| {
            100.0
                * (1.0 - hip_score / t.all_arm_max_hip_score)
                * (offset / (2.0 * t.all_arm_min_wrist_offset)).min(1.0)
        })
}

fn is_early_release(ctx: &FrameContext<'_>, t: &FormErrorThresholds) -> bool {
    let forward_early = ctx.progress < t.early_release_progress
        && ctx
            .pose
            .wrist_forward_of_shoulder()
            .is_some_and(|forward| forward > t.early_release_margin);

    let extending_early = ctx.progress < t.early_extension_progress
        && match (ctx.pose.elbow_angle(), ctx.previous.and_then(|p| p.elbow_angle())) {
            (Some(angle), Some(before)) => {
                angle - before >= t.early_extension_min_delta_deg
                    && angle >= t.early_extension_min_angle_deg
            }
            _ => false,
        };

    forward_early || extending_early
}
