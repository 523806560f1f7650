//! Continuous throw metrics reduced over a whole frame sequence.
//!
//! The five headline metrics use a fraction-of-good-frames score: a frame
//! counts only when every keypoint its criterion needs is usable, so a
//! low-confidence joint can remove a frame from the tally but never add a
//! good one.

use discform_core::{AnalysisConfig, Frame, RatingBands};
use serde::{Deserialize, Serialize};

use crate::features::{hip_rotation_between, ThrowPose};

/// Rating band for a metric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Good,
    Warning,
    Error,
}

impl Rating {
    pub fn from_score(score: f64, bands: &RatingBands) -> Self {
        if score > bands.good {
            Rating::Good
        } else if score > bands.warning {
            Rating::Warning
        } else {
            Rating::Error
        }
    }
}

/// The five headline metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Posture,
    Balance,
    HipRotation,
    Arm,
    FollowThrough,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Posture,
        MetricKind::Balance,
        MetricKind::HipRotation,
        MetricKind::Arm,
        MetricKind::FollowThrough,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Posture => "Posture",
            MetricKind::Balance => "Balance",
            MetricKind::HipRotation => "Hip rotation",
            MetricKind::Arm => "Arm extension",
            MetricKind::FollowThrough => "Follow-through",
        }
    }

    /// Coaching text for a rating
    pub fn text(&self, rating: Rating) -> &'static str {
        match (self, rating) {
            (MetricKind::Posture, Rating::Good) => "Excellent upright posture",
            (MetricKind::Posture, Rating::Warning) => "Good posture, room to improve",
            (MetricKind::Posture, Rating::Error) => "Try to keep your back straighter",
            (MetricKind::Balance, Rating::Good) => "Stable balance through the throw",
            (MetricKind::Balance, Rating::Warning) => "Balance could be better",
            (MetricKind::Balance, Rating::Error) => "Work on foot placement for better balance",
            (MetricKind::HipRotation, Rating::Good) => "Good hip rotation for power",
            (MetricKind::HipRotation, Rating::Warning) => "Increase hip rotation for more power",
            (MetricKind::HipRotation, Rating::Error) => "Focus on rotating the hips more",
            (MetricKind::Arm, Rating::Good) => "Good arm extension",
            (MetricKind::Arm, Rating::Warning) => "Extend the arm further",
            (MetricKind::Arm, Rating::Error) => "The arm needs more extension for maximum power",
            (MetricKind::FollowThrough, Rating::Good) => "Good follow-through",
            (MetricKind::FollowThrough, Rating::Warning) => "Follow through the throw more",
            (MetricKind::FollowThrough, Rating::Error) => {
                "Following through completely is important"
            }
        }
    }
}

/// Score, rating band and coaching text for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    /// 0-100
    pub score: f64,
    pub rating: Rating,
    pub text: String,
}

impl MetricScore {
    fn rated(kind: MetricKind, score: f64, bands: &RatingBands) -> Self {
        let score = score.clamp(0.0, 100.0);
        let rating = Rating::from_score(score, bands);
        Self {
            score,
            rating,
            text: kind.text(rating).to_string(),
        }
    }

    /// No frame had the joints this metric needs
    fn insufficient(kind: MetricKind) -> Self {
        Self {
            score: 0.0,
            rating: Rating::Error,
            text: format!("Not enough usable keypoints to judge {}", kind.name().to_lowercase()),
        }
    }

    pub fn is_good(&self) -> bool {
        self.rating == Rating::Good
    }
}

/// Good/eligible frame tally
#[derive(Debug, Clone, Copy, Default)]
struct FrameTally {
    good: usize,
    eligible: usize,
}

impl FrameTally {
    /// `None` means the frame lacked the required keypoints
    fn record(&mut self, judgement: Option<bool>) {
        if let Some(good) = judgement {
            self.eligible += 1;
            if good {
                self.good += 1;
            }
        }
    }

    fn percentage(&self) -> Option<f64> {
        (self.eligible > 0).then(|| self.good as f64 / self.eligible as f64 * 100.0)
    }

    fn into_score(self, kind: MetricKind, bands: &RatingBands) -> MetricScore {
        match self.percentage() {
            Some(score) => MetricScore::rated(kind, score, bands),
            None => MetricScore::insufficient(kind),
        }
    }
}

/// Headline metrics package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub posture: MetricScore,
    pub balance: MetricScore,
    pub hip_rotation: MetricScore,
    pub arm: MetricScore,
    pub follow_through: MetricScore,
}

impl HeadlineMetrics {
    pub fn from_frames(frames: &[Frame], config: &AnalysisConfig) -> Self {
        Self {
            posture: posture(frames, config),
            balance: balance(frames, config),
            hip_rotation: hip_rotation(frames, config),
            arm: arm_extension(frames, config),
            follow_through: follow_through(frames, config),
        }
    }

    pub fn get(&self, kind: MetricKind) -> &MetricScore {
        match kind {
            MetricKind::Posture => &self.posture,
            MetricKind::Balance => &self.balance,
            MetricKind::HipRotation => &self.hip_rotation,
            MetricKind::Arm => &self.arm,
            MetricKind::FollowThrough => &self.follow_through,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, &MetricScore)> {
        MetricKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn mean_score(&self) -> f64 {
        self.iter().map(|(_, m)| m.score).sum::<f64>() / MetricKind::ALL.len() as f64
    }
}

/// Throwing shoulder stacked over the throwing hip
pub fn posture(frames: &[Frame], config: &AnalysisConfig) -> MetricScore {
    let limit = config.metrics.posture_max_offset;
    let mut tally = FrameTally::default();

    for frame in frames {
        let pose = ThrowPose::new(frame, config);
        tally.record(pose.posture_offset().map(|offset| offset < limit));
    }

    tally.into_score(MetricKind::Posture, &config.metrics.posture_bands)
}

/// Ankle spacing inside the stance band
pub fn balance(frames: &[Frame], config: &AnalysisConfig) -> MetricScore {
    let m = &config.metrics;
    let mut tally = FrameTally::default();

    for frame in frames {
        let pose = ThrowPose::new(frame, config);
        tally.record(
            pose.stance_width()
                .map(|width| width > m.stance_min && width < m.stance_max),
        );
    }

    tally.into_score(MetricKind::Balance, &m.balance_bands)
}

/// Largest frame-to-frame hip-line rotation, scaled against the expected maximum
pub fn hip_rotation(frames: &[Frame], config: &AnalysisConfig) -> MetricScore {
    let m = &config.metrics;

    match max_hip_rotation(frames, config) {
        Some(max) => MetricScore::rated(
            MetricKind::HipRotation,
            (max / m.expected_max_hip_rotation * 100.0).min(100.0),
            &m.hip_rotation_bands,
        ),
        None => MetricScore::insufficient(MetricKind::HipRotation),
    }
}

/// Maximum hip rotation (radians) over consecutive frame pairs
pub fn max_hip_rotation(frames: &[Frame], config: &AnalysisConfig) -> Option<f64> {
    frames
        .windows(2)
        .filter_map(|pair| {
            let previous = ThrowPose::new(&pair[0], config);
            let current = ThrowPose::new(&pair[1], config);
            hip_rotation_between(&previous, &current)
        })
        .reduce(f64::max)
}

/// Throwing arm reaching past the extension length
pub fn arm_extension(frames: &[Frame], config: &AnalysisConfig) -> MetricScore {
    let min_length = config.metrics.arm_min_length;
    let mut tally = FrameTally::default();

    for frame in frames {
        let pose = ThrowPose::new(frame, config);
        tally.record(pose.arm_length().map(|length| length > min_length));
    }

    tally.into_score(MetricKind::Arm, &config.metrics.arm_bands)
}

/// Wrist ahead of the shoulder during the final quarter of the sequence
pub fn follow_through(frames: &[Frame], config: &AnalysisConfig) -> MetricScore {
    let m = &config.metrics;
    if frames.len() < m.min_follow_through_frames {
        return MetricScore {
            score: 50.0,
            rating: Rating::Warning,
            text: "Sequence too short to analyze follow-through".to_string(),
        };
    }

    let start = (frames.len() as f64 * 0.75).floor() as usize;
    let mut tally = FrameTally::default();

    for frame in &frames[start..] {
        let pose = ThrowPose::new(frame, config);
        tally.record(pose.wrist_forward_of_shoulder().map(|forward| forward > 0.0));
    }

    tally.into_score(MetricKind::FollowThrough, &m.follow_through_bands)
}

/// Secondary measurements; `None` means not computable from the usable joints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplementaryMetrics {
    /// Mean hip-shoulder separation (degrees)
    pub hip_shoulder_separation_avg_deg: Option<f64>,
    /// Peak hip-shoulder separation (degrees)
    pub hip_shoulder_separation_max_deg: Option<f64>,
    /// Forward travel of the ankle midpoint from first to last frame
    pub weight_transfer: Option<f64>,
    /// Mean throwing-wrist height above the hips over the release window
    pub release_height_avg: Option<f64>,
    /// Standard deviation of that height
    pub release_height_variation: Option<f64>,
    /// Peak separation against the expected maximum, 0-100
    pub timing_score: Option<f64>,
}

impl SupplementaryMetrics {
    pub fn from_frames(frames: &[Frame], config: &AnalysisConfig) -> Self {
        let separations: Vec<f64> = frames
            .iter()
            .filter_map(|f| ThrowPose::new(f, config).hip_shoulder_separation())
            .collect();

        let separation_avg = mean(&separations);
        let separation_max = separations.iter().copied().reduce(f64::max);
        let timing_score = separation_max.map(|max| {
            (max / config.metrics.expected_max_separation_deg * 100.0).min(100.0)
        });

        let window = config.metrics.release_window_frames.min(frames.len());
        let heights: Vec<f64> = frames[frames.len() - window..]
            .iter()
            .filter_map(|f| ThrowPose::new(f, config).wrist_height())
            .collect();

        let release_height_avg = mean(&heights);
        let release_height_variation = release_height_avg.map(|avg| {
            let variance =
                heights.iter().map(|h| (h - avg).powi(2)).sum::<f64>() / heights.len() as f64;
            variance.sqrt()
        });

        Self {
            hip_shoulder_separation_avg_deg: separation_avg,
            hip_shoulder_separation_max_deg: separation_max,
            weight_transfer: weight_transfer(frames, config),
            release_height_avg,
            release_height_variation,
            timing_score,
        }
    }
}

/// Forward shift of the base of support between the first and last usable frames
fn weight_transfer(frames: &[Frame], config: &AnalysisConfig) -> Option<f64> {
    let mut stances = frames.iter().filter_map(|f| {
        let pose = ThrowPose::new(f, config);
        pose.ankle_midpoint().map(|mid| (pose, mid))
    });

    let (first_pose, first) = stances.next()?;
    let last = stances.last().map(|(_, mid)| mid).unwrap_or(first);
    Some(first_pose.forward(&last, &first))
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}
