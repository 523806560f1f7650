//! Analysis configuration.
//!
//! Defaults assume pixel coordinates from a roughly 500px-tall frame.
//! [`AnalysisConfig::normalized`] provides thresholds for [0, 1] coordinates.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Side, ThrowDirection};

/// Complete analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Keypoints at or below this confidence are ignored
    pub confidence_gate: f64,

    /// Maximum number of frames a session accepts
    pub max_frames: usize,

    /// Arm that throws the disc
    pub throwing_side: Side,

    /// Leg that plants and braces; defaults to the throwing side (backhand)
    pub brace_side: Option<Side>,

    /// Which way the thrower moves in the image
    pub throw_direction: ThrowDirection,

    /// Re-check event ordering against the final slot state
    pub revalidate_event_chain: bool,

    pub metrics: MetricThresholds,
    pub events: EventThresholds,
    pub form_errors: FormErrorThresholds,
    pub scoring: ScoringConfig,
}

/// Two cut points mapping a 0-100 score to a rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingBands {
    /// Scores strictly above this are good
    pub good: f64,
    /// Scores strictly above this (and not good) are a warning
    pub warning: f64,
}

impl RatingBands {
    pub fn new(good: f64, warning: f64) -> Self {
        Self { good, warning }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricThresholds {
    /// Max horizontal shoulder-hip offset for an upright frame
    pub posture_max_offset: f64,
    pub posture_bands: RatingBands,

    /// Ankle distance band for a stable stance
    pub stance_min: f64,
    pub stance_max: f64,
    pub balance_bands: RatingBands,

    /// Hip-line angle change (radians) that maps to a full score
    pub expected_max_hip_rotation: f64,
    pub hip_rotation_bands: RatingBands,

    /// Shoulder-wrist distance counted as an extended arm
    pub arm_min_length: f64,
    pub arm_bands: RatingBands,

    /// Sequences shorter than this get a neutral follow-through score
    pub min_follow_through_frames: usize,
    pub follow_through_bands: RatingBands,

    /// Trailing frames averaged for release height
    pub release_window_frames: usize,

    /// Hip-shoulder separation (degrees) that maps to a full timing score
    pub expected_max_separation_deg: f64,
}

/// Minimum quality score for an event to enter the gallery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryThresholds {
    pub reachback: f64,
    pub power_pocket: f64,
    pub brace: f64,
    pub release: f64,
    pub follow_through: f64,
    pub x_step: f64,
    pub best_balance: f64,
    pub max_hip_rotation: f64,
    pub best_off_arm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventThresholds {
    /// Wrist must be behind the throwing hip by more than this
    pub reachback_margin: f64,
    pub reachback_min_extension: f64,
    pub reachback_min_shoulder_width: f64,

    pub pocket_elbow_min_deg: f64,
    pub pocket_elbow_max_deg: f64,
    /// Max horizontal wrist-shoulder offset in the power pocket
    pub pocket_max_hand_offset: f64,

    pub brace_min_knee_deg: f64,
    /// How far the brace ankle may sit behind the knee
    pub brace_ankle_tolerance: f64,

    /// Wrist must be forward of the shoulder by more than this
    pub release_margin: f64,
    pub release_min_extension: f64,

    /// Wrist must be forward of the off-side shoulder by more than this
    pub follow_through_margin: f64,
    pub follow_through_min_gap_secs: f64,

    pub x_step_min_cross: f64,

    pub off_arm_max_distance: f64,

    pub gallery: GalleryThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormErrorThresholds {
    pub rounding_max_elbow_torso: f64,
    pub rounding_elbow_margin: f64,
    pub rounding_max_extension: f64,

    pub nose_up_margin: f64,

    pub all_arm_max_hip_score: f64,
    pub all_arm_min_wrist_offset: f64,
    pub all_arm_max_hip_width_change: f64,

    pub early_release_margin: f64,
    pub early_release_progress: f64,
    pub early_extension_progress: f64,
    pub early_extension_min_delta_deg: f64,
    pub early_extension_min_angle_deg: f64,
    pub early_release_severity: f64,

    pub no_brace_progress: f64,
    pub no_brace_severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub high_penalty: u32,
    pub medium_penalty: u32,
    pub low_penalty: u32,

    /// Issue severity at or above this is high
    pub high_severity: f64,
    /// Issue severity at or above this is medium
    pub medium_severity: f64,

    pub excellent_score: u8,
    pub good_score: u8,
    pub needs_work_score: u8,

    /// Issues shown per feedback band: excellent, good, needs work, coaching
    pub issues_per_band: [usize; 4],
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_gate: 0.3,
            max_frames: 300,
            throwing_side: Side::Right,
            brace_side: None,
            throw_direction: ThrowDirection::LeftToRight,
            revalidate_event_chain: true,
            metrics: MetricThresholds::default(),
            events: EventThresholds::default(),
            form_errors: FormErrorThresholds::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for MetricThresholds {
    fn default() -> Self {
        Self {
            posture_max_offset: 50.0,
            posture_bands: RatingBands::new(80.0, 60.0),
            stance_min: 50.0,
            stance_max: 200.0,
            balance_bands: RatingBands::new(75.0, 50.0),
            expected_max_hip_rotation: 1.5,
            hip_rotation_bands: RatingBands::new(70.0, 50.0),
            arm_min_length: 150.0,
            arm_bands: RatingBands::new(70.0, 50.0),
            min_follow_through_frames: 10,
            follow_through_bands: RatingBands::new(60.0, 40.0),
            release_window_frames: 10,
            expected_max_separation_deg: 45.0,
        }
    }
}

impl Default for GalleryThresholds {
    fn default() -> Self {
        Self {
            reachback: 50.0,
            power_pocket: 50.0,
            brace: 60.0,
            release: 60.0,
            follow_through: 50.0,
            x_step: 50.0,
            best_balance: 50.0,
            max_hip_rotation: 50.0,
            best_off_arm: 50.0,
        }
    }
}

impl Default for EventThresholds {
    fn default() -> Self {
        Self {
            reachback_margin: 50.0,
            reachback_min_extension: 0.9,
            reachback_min_shoulder_width: 60.0,
            pocket_elbow_min_deg: 70.0,
            pocket_elbow_max_deg: 110.0,
            pocket_max_hand_offset: 60.0,
            brace_min_knee_deg: 160.0,
            brace_ankle_tolerance: 10.0,
            release_margin: 30.0,
            release_min_extension: 0.85,
            follow_through_margin: 40.0,
            follow_through_min_gap_secs: 0.1,
            x_step_min_cross: 10.0,
            off_arm_max_distance: 80.0,
            gallery: GalleryThresholds::default(),
        }
    }
}

impl Default for FormErrorThresholds {
    fn default() -> Self {
        Self {
            rounding_max_elbow_torso: 25.0,
            rounding_elbow_margin: 10.0,
            rounding_max_extension: 0.8,
            nose_up_margin: 20.0,
            all_arm_max_hip_score: 30.0,
            all_arm_min_wrist_offset: 100.0,
            all_arm_max_hip_width_change: 5.0,
            early_release_margin: 30.0,
            early_release_progress: 0.4,
            early_extension_progress: 0.5,
            early_extension_min_delta_deg: 15.0,
            early_extension_min_angle_deg: 140.0,
            early_release_severity: 70.0,
            no_brace_progress: 0.3,
            no_brace_severity: 60.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            high_penalty: 15,
            medium_penalty: 10,
            low_penalty: 5,
            high_severity: 70.0,
            medium_severity: 40.0,
            excellent_score: 85,
            good_score: 70,
            needs_work_score: 50,
            issues_per_band: [2, 3, 4, 5],
        }
    }
}

impl AnalysisConfig {
    /// Thresholds for keypoints in normalized [0, 1] image coordinates
    pub fn normalized() -> Self {
        let scale = 1.0 / 500.0;
        let mut config = Self::default();

        config.metrics.posture_max_offset = 0.1;
        config.metrics.stance_min = 0.1;
        config.metrics.stance_max = 0.4;
        config.metrics.arm_min_length = 0.3;

        let events = &mut config.events;
        events.reachback_margin *= scale;
        events.reachback_min_shoulder_width *= scale;
        events.pocket_max_hand_offset *= scale;
        events.brace_ankle_tolerance *= scale;
        events.release_margin *= scale;
        events.follow_through_margin *= scale;
        events.x_step_min_cross *= scale;
        events.off_arm_max_distance *= scale;

        let errors = &mut config.form_errors;
        errors.rounding_max_elbow_torso *= scale;
        errors.rounding_elbow_margin *= scale;
        errors.nose_up_margin *= scale;
        errors.all_arm_min_wrist_offset *= scale;
        errors.all_arm_max_hip_width_change *= scale;
        errors.early_release_margin *= scale;

        config
    }

    /// Load configuration from a file, with `DISCFORM__*` environment overrides
    pub fn from_file(path: &str) -> std::result::Result<Self, ::config::ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path))
            .add_source(::config::Environment::with_prefix("DISCFORM").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables only
    pub fn from_env() -> std::result::Result<Self, ::config::ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::Environment::with_prefix("DISCFORM").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Brace leg, falling back to the throwing side
    pub fn brace_leg(&self) -> Side {
        self.brace_side.unwrap_or(self.throwing_side)
    }

    /// Reject configurations that would make the analysis meaningless
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.confidence_gate) {
            return Err(Error::Config(format!(
                "confidence_gate must be in [0, 1), got {}",
                self.confidence_gate
            )));
        }
        if self.max_frames == 0 {
            return Err(Error::Config("max_frames must be positive".to_string()));
        }

        let m = &self.metrics;
        if m.stance_min >= m.stance_max {
            return Err(Error::Config(format!(
                "stance band is empty: {} >= {}",
                m.stance_min, m.stance_max
            )));
        }
        if m.expected_max_hip_rotation <= 0.0 || m.expected_max_separation_deg <= 0.0 {
            return Err(Error::Config(
                "expected rotation and separation must be positive".to_string(),
            ));
        }
        for (name, bands) in [
            ("posture", m.posture_bands),
            ("balance", m.balance_bands),
            ("hip_rotation", m.hip_rotation_bands),
            ("arm", m.arm_bands),
            ("follow_through", m.follow_through_bands),
        ] {
            if bands.warning > bands.good {
                return Err(Error::Config(format!(
                    "{name} bands: warning cut {} is above good cut {}",
                    bands.warning, bands.good
                )));
            }
        }

        let e = &self.events;
        if e.pocket_elbow_min_deg > e.pocket_elbow_max_deg {
            return Err(Error::Config("power pocket elbow range is empty".to_string()));
        }

        // Margins and divisors of the quality and severity scales
        let f = &self.form_errors;
        for (name, value) in [
            ("events.follow_through_min_gap_secs", e.follow_through_min_gap_secs),
            ("events.reachback_margin", e.reachback_margin),
            ("events.pocket_max_hand_offset", e.pocket_max_hand_offset),
            ("events.brace_ankle_tolerance", e.brace_ankle_tolerance),
            ("events.release_margin", e.release_margin),
            ("events.follow_through_margin", e.follow_through_margin),
            ("events.x_step_min_cross", e.x_step_min_cross),
            ("events.off_arm_max_distance", e.off_arm_max_distance),
            ("form_errors.rounding_max_elbow_torso", f.rounding_max_elbow_torso),
            ("form_errors.nose_up_margin", f.nose_up_margin),
            ("form_errors.all_arm_max_hip_score", f.all_arm_max_hip_score),
            ("form_errors.all_arm_min_wrist_offset", f.all_arm_min_wrist_offset),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let s = &self.scoring;
        if !(s.needs_work_score <= s.good_score && s.good_score <= s.excellent_score) {
            return Err(Error::Config("feedback band scores must be ascending".to_string()));
        }
        if s.medium_severity > s.high_severity {
            return Err(Error::Config(
                "medium severity cut is above high severity cut".to_string(),
            ));
        }

        Ok(())
    }
}
