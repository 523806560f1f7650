//! Key-event detection.
//!
//! Nine slots each keep the single best frame seen so far for one phase of
//! the throw. A slot is replaced only by a candidate that passes the phase's
//! detection predicate and gallery threshold, respects the phase ordering
//! against the other slots as they stand at that moment, and strictly
//! improves the stored quality score.

use discform_core::{AnalysisConfig, EventThresholds, Frame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::features::{hip_rotation_between, ThrowPose};

/// Phases and gallery moments of a throw
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Reachback,
    PowerPocket,
    Brace,
    Release,
    FollowThrough,
    XStep,
    BestBalance,
    MaxHipRotation,
    BestOffArm,
}

impl EventKind {
    pub const COUNT: usize = 9;

    /// Evaluation order; predecessors come before the events that depend on them
    pub const ALL: [EventKind; Self::COUNT] = [
        EventKind::Reachback,
        EventKind::PowerPocket,
        EventKind::Brace,
        EventKind::Release,
        EventKind::FollowThrough,
        EventKind::XStep,
        EventKind::BestBalance,
        EventKind::MaxHipRotation,
        EventKind::BestOffArm,
    ];

    /// Order in which the phase chain is re-checked at finalize
    pub const CHAIN: [EventKind; 4] = [
        EventKind::PowerPocket,
        EventKind::Brace,
        EventKind::Release,
        EventKind::FollowThrough,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn description(&self) -> &'static str {
        match self {
            EventKind::Reachback => "Arm extended fully back before the pull",
            EventKind::PowerPocket => "Elbow bent with the disc pulled close to the chest",
            EventKind::Brace => "Front leg planted and straightened",
            EventKind::Release => "Arm extending through the hit",
            EventKind::FollowThrough => "Arm continuing across the body after release",
            EventKind::XStep => "Feet crossing during the run-up",
            EventKind::BestBalance => "Most centered stance",
            EventKind::MaxHipRotation => "Fastest hip turn",
            EventKind::BestOffArm => "Off arm held tight to the body",
        }
    }

    /// The phase this one must follow, when that phase has been seen
    pub fn predecessor(&self) -> Option<EventKind> {
        match self {
            EventKind::PowerPocket | EventKind::Brace => Some(EventKind::Reachback),
            EventKind::Release => Some(EventKind::PowerPocket),
            EventKind::FollowThrough => Some(EventKind::Release),
            _ => None,
        }
    }

    fn gallery_min(&self, thresholds: &EventThresholds) -> f64 {
        let g = &thresholds.gallery;
        match self {
            EventKind::Reachback => g.reachback,
            EventKind::PowerPocket => g.power_pocket,
            EventKind::Brace => g.brace,
            EventKind::Release => g.release,
            EventKind::FollowThrough => g.follow_through,
            EventKind::XStep => g.x_step,
            EventKind::BestBalance => g.best_balance,
            EventKind::MaxHipRotation => g.max_hip_rotation,
            EventKind::BestOffArm => g.best_off_arm,
        }
    }

    /// Whether an event at `timestamp` may follow a predecessor at `previous`
    fn follows(&self, timestamp: f64, previous: f64, thresholds: &EventThresholds) -> bool {
        match self {
            EventKind::FollowThrough => {
                timestamp - previous >= thresholds.follow_through_min_gap_secs
            }
            _ => timestamp > previous,
        }
    }
}

/// The best frame recorded for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub kind: EventKind,
    /// Quality score, 0-100
    pub score: f64,
    pub timestamp: f64,
    pub frame_index: usize,
    /// Snapshot of the frame for display
    pub frame: Frame,
}

/// Everything the detectors see for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub pose: ThrowPose<'a>,
    pub previous: Option<ThrowPose<'a>>,
    pub index: usize,
    /// Timestamp over sequence duration
    pub progress: f64,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        frame: &'a Frame,
        previous: Option<&'a Frame>,
        index: usize,
        duration: f64,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            pose: ThrowPose::new(frame, config),
            previous: previous.map(|f| ThrowPose::new(f, config)),
            index,
            progress: frame.timestamp / duration,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.pose.timestamp()
    }
}

/// A frame that passed an event's predicate and gallery threshold.
///
/// Only [`Candidate::detect`] builds these.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    kind: EventKind,
    score: f64,
    frame: &'a Frame,
    index: usize,
}

impl<'a> Candidate<'a> {
    pub fn detect(kind: EventKind, ctx: &FrameContext<'a>, config: &AnalysisConfig) -> Option<Self> {
        let e = &config.events;
        let pose = &ctx.pose;

        let score = match kind {
            EventKind::Reachback => reachback_quality(pose, e),
            EventKind::PowerPocket => power_pocket_quality(pose, e),
            EventKind::Brace => {
                brace_pose(pose, e).map(|(knee, ankle)| brace_quality(knee, ankle, e))
            }
            EventKind::Release => release_quality(pose, e),
            EventKind::FollowThrough => follow_through_quality(pose, e),
            EventKind::XStep => x_step_quality(pose, e),
            EventKind::BestBalance => balance_quality(pose, config),
            EventKind::MaxHipRotation => ctx
                .previous
                .as_ref()
                .and_then(|prev| hip_rotation_between(prev, pose))
                .map(|change| hip_rotation_score(change, config)),
            EventKind::BestOffArm => off_arm_quality(pose, e),
        }?
        .clamp(0.0, 100.0);

        (score >= kind.gallery_min(e)).then(|| Self {
            kind,
            score,
            frame: pose.frame(),
            index: ctx.index,
        })
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn timestamp(&self) -> f64 {
        self.frame.timestamp
    }
}

/// Per-frame hip rotation on a 0-100 scale against the expected maximum
pub fn hip_rotation_score(change: f64, config: &AnalysisConfig) -> f64 {
    (change / config.metrics.expected_max_hip_rotation * 100.0).min(100.0)
}

fn reachback_quality(pose: &ThrowPose<'_>, e: &EventThresholds) -> Option<f64> {
    let behind = -pose.wrist_forward_of_hip()?;
    let extension = pose.arm_extension()?;
    let shoulders = pose.shoulder_width()?;

    if behind > e.reachback_margin
        && extension >= e.reachback_min_extension
        && shoulders > e.reachback_min_shoulder_width
    {
        Some(50.0 * extension + 50.0 * (behind / (2.0 * e.reachback_margin)).min(1.0))
    } else {
        None
    }
}

fn power_pocket_quality(pose: &ThrowPose<'_>, e: &EventThresholds) -> Option<f64> {
    let arm = pose.throwing_arm()?;
    let angle = pose.elbow_angle()?;
    let offset = (arm.wrist.x - arm.shoulder.x).abs();

    if (e.pocket_elbow_min_deg..=e.pocket_elbow_max_deg).contains(&angle)
        && offset < e.pocket_max_hand_offset
    {
        Some(
            60.0 * (1.0 - (angle - 90.0).abs() / 20.0)
                + 40.0 * (1.0 - offset / e.pocket_max_hand_offset),
        )
    } else {
        None
    }
}

/// Knee angle and ankle offset when the brace leg is planted straight
pub(crate) fn brace_pose(pose: &ThrowPose<'_>, e: &EventThresholds) -> Option<(f64, f64)> {
    let knee = pose.brace_knee_angle()?;
    let ankle_forward = pose.brace_ankle_forward()?;

    (knee >= e.brace_min_knee_deg && ankle_forward >= -e.brace_ankle_tolerance)
        .then_some((knee, ankle_forward))
}

fn brace_quality(knee: f64, ankle_forward: f64, e: &EventThresholds) -> f64 {
    let tolerance = e.brace_ankle_tolerance;
    80.0 * ((knee - 150.0) / 30.0).min(1.0)
        + 20.0 * ((ankle_forward + tolerance) / (3.0 * tolerance)).min(1.0)
}

fn release_quality(pose: &ThrowPose<'_>, e: &EventThresholds) -> Option<f64> {
    let forward = pose.wrist_forward_of_shoulder()?;
    let extension = pose.arm_extension()?;

    (forward > e.release_margin && extension >= e.release_min_extension)
        .then(|| 60.0 * extension + 40.0 * (forward / (3.0 * e.release_margin)).min(1.0))
}

fn follow_through_quality(pose: &ThrowPose<'_>, e: &EventThresholds) -> Option<f64> {
    let forward = pose.wrist_forward_of_off_shoulder()?;
    if forward <= e.follow_through_margin {
        return None;
    }

    let arm = pose.throwing_arm()?;
    let finish = if arm.wrist.y > arm.shoulder.y { 1.0 } else { 0.5 };
    Some(70.0 * (forward / (2.5 * e.follow_through_margin)).min(1.0) + 30.0 * finish)
}

fn x_step_quality(pose: &ThrowPose<'_>, e: &EventThresholds) -> Option<f64> {
    let cross = pose.ankle_cross()?;
    (cross > e.x_step_min_cross).then(|| (cross / (6.0 * e.x_step_min_cross)).min(1.0) * 100.0)
}

fn balance_quality(pose: &ThrowPose<'_>, config: &AnalysisConfig) -> Option<f64> {
    let m = &config.metrics;
    let stance = pose.stance_width()?;
    if stance <= m.stance_min || stance >= m.stance_max {
        return None;
    }
    let lean = pose.balance_lean()?;
    Some(100.0 * (1.0 - lean / m.stance_max))
}

fn off_arm_quality(pose: &ThrowPose<'_>, e: &EventThresholds) -> Option<f64> {
    let d = pose.off_arm_distance()?;
    (d < e.off_arm_max_distance).then(|| 100.0 * (1.0 - d / e.off_arm_max_distance))
}

/// One slot per [`EventKind`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSlots {
    slots: [Option<KeyEvent>; EventKind::COUNT],
}

impl EventSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: EventKind) -> Option<&KeyEvent> {
        self.slots[kind.index()].as_ref()
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Run every detector on one frame and offer what qualifies
    pub fn observe(&mut self, ctx: &FrameContext<'_>, config: &AnalysisConfig) {
        for kind in EventKind::ALL {
            if let Some(candidate) = Candidate::detect(kind, ctx, config) {
                self.offer(candidate, &config.events);
            }
        }
    }

    fn precedence_holds(&self, kind: EventKind, timestamp: f64, e: &EventThresholds) -> bool {
        match kind.predecessor().and_then(|p| self.get(p)) {
            Some(previous) => kind.follows(timestamp, previous.timestamp, e),
            None => true,
        }
    }

    /// Store the candidate if it respects ordering and beats the current best.
    ///
    /// Reads the other slots, writes only the candidate's own slot.
    pub fn offer(&mut self, candidate: Candidate<'_>, e: &EventThresholds) -> bool {
        let kind = candidate.kind;
        if !self.precedence_holds(kind, candidate.timestamp(), e) {
            return false;
        }

        let slot = &mut self.slots[kind.index()];
        if let Some(current) = slot {
            if candidate.score <= current.score {
                return false;
            }
            tracing::debug!(
                "Replacing {:?} at {:.3}s (score {:.1}) with {:.3}s (score {:.1})",
                kind,
                current.timestamp,
                current.score,
                candidate.timestamp(),
                candidate.score
            );
        }

        *slot = Some(KeyEvent {
            kind,
            score: candidate.score,
            timestamp: candidate.timestamp(),
            frame_index: candidate.index,
            frame: candidate.frame.clone(),
        });

        debug_assert!(self.precedence_holds(kind, candidate.timestamp(), e));
        true
    }

    /// Copy with chain events that no longer follow their predecessor removed
    pub fn revalidated(&self, e: &EventThresholds) -> Self {
        let mut checked = self.clone();

        for kind in EventKind::CHAIN {
            let Some(event) = checked.get(kind) else {
                continue;
            };
            if !checked.precedence_holds(kind, event.timestamp, e) {
                tracing::debug!(
                    "Dropping {:?} at {:.3}s: it no longer follows {:?}",
                    kind,
                    event.timestamp,
                    kind.predecessor()
                );
                checked.slots[kind.index()] = None;
            }
        }

        checked
    }

    pub fn to_map(&self) -> BTreeMap<EventKind, Option<KeyEvent>> {
        EventKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind).cloned()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::tests::{set_xy, standing_frame};
    use discform_core::Keypoint;

    fn observe_all(frames: &[Frame], config: &AnalysisConfig) -> EventSlots {
        let duration = frames.last().map(|f| f.timestamp).unwrap_or(1.0);
        let mut slots = EventSlots::new();
        for (i, frame) in frames.iter().enumerate() {
            let previous = i.checked_sub(1).map(|p| &frames[p]);
            let ctx = FrameContext::new(frame, previous, i, duration, config);
            slots.observe(&ctx, config);
        }
        slots
    }

    /// Throwing arm straight back, wrist `behind` px behind the throwing hip
    fn reachback_frame(ts: f64, behind: f64) -> Frame {
        let mut frame = standing_frame(ts);
        let wrist_x = 330.0 - behind;
        set_xy(&mut frame, Keypoint::RightWrist, wrist_x, 150.0);
        set_xy(&mut frame, Keypoint::RightElbow, (340.0 + wrist_x) / 2.0, 150.0);
        frame
    }

    /// Elbow at 90° with the hand in front of the chest
    fn pocket_frame(ts: f64) -> Frame {
        let mut frame = standing_frame(ts);
        set_xy(&mut frame, Keypoint::RightElbow, 340.0, 220.0);
        set_xy(&mut frame, Keypoint::RightWrist, 380.0, 220.0);
        frame
    }

    /// Arm fully extended forward at shoulder height
    fn release_frame(ts: f64) -> Frame {
        let mut frame = standing_frame(ts);
        set_xy(&mut frame, Keypoint::RightElbow, 400.0, 150.0);
        set_xy(&mut frame, Keypoint::RightWrist, 460.0, 150.0);
        frame
    }

    /// Throwing arm bent to `extension`, wrist `behind` px behind the throwing
    /// hip, shoulders 100px apart
    fn bent_reachback_frame(ts: f64, behind: f64, extension: f64) -> Frame {
        let mut frame = standing_frame(ts);
        set_xy(&mut frame, Keypoint::LeftShoulder, 240.0, 150.0);
        let wrist_x = 330.0 - behind;
        let half = (340.0 - wrist_x) / 2.0;
        let rise = half * (1.0 / (extension * extension) - 1.0).sqrt();
        set_xy(&mut frame, Keypoint::RightElbow, wrist_x + half, 150.0 - rise);
        set_xy(&mut frame, Keypoint::RightWrist, wrist_x, 150.0);
        frame
    }

    fn hide(frame: &mut Frame, keypoint: Keypoint) {
        let mut observation = *frame.get(keypoint);
        observation.confidence = 0.2;
        frame.set(keypoint, observation);
    }

    #[test]
    fn test_reachback_keeps_best_frame() {
        let config = AnalysisConfig::default();
        let frames = vec![reachback_frame(0.0, 80.0), reachback_frame(0.1, 60.0)];
        let slots = observe_all(&frames, &config);

        let event = slots.get(EventKind::Reachback).unwrap();
        assert!((event.score - 90.0).abs() < 1e-9);
        assert_eq!(event.timestamp, 0.0);
        assert_eq!(event.frame_index, 0);
    }

    #[test]
    fn test_bent_reachback_is_kept_over_weaker_frame() {
        let config = AnalysisConfig::default();
        let frames = vec![
            bent_reachback_frame(0.0, 60.0, 0.95),
            bent_reachback_frame(0.1, 55.0, 0.95),
        ];

        let first = FrameContext::new(&frames[0], None, 0, 1.0, &config);
        assert!((first.pose.arm_extension().unwrap() - 0.95).abs() < 1e-9);
        assert_eq!(first.pose.shoulder_width(), Some(100.0));

        // The later frame qualifies, but scores lower
        let later = FrameContext::new(&frames[1], Some(&frames[0]), 1, 1.0, &config);
        let candidate = Candidate::detect(EventKind::Reachback, &later, &config).unwrap();
        assert!((candidate.score() - 75.0).abs() < 1e-6);

        let slots = observe_all(&frames, &config);
        let event = slots.get(EventKind::Reachback).unwrap();
        assert!((event.score - 77.5).abs() < 1e-6);
        assert_eq!(event.timestamp, 0.0);
        assert_eq!(event.frame_index, 0);
    }

    #[test]
    fn test_each_detector_scores_qualifying_frame() {
        let config = AnalysisConfig::default();

        let mut brace = standing_frame(0.0);
        set_xy(&mut brace, Keypoint::RightHip, 330.0, 300.0);
        set_xy(&mut brace, Keypoint::RightKnee, 340.0, 400.0);
        set_xy(&mut brace, Keypoint::RightAnkle, 350.0, 500.0);

        let mut x_step = standing_frame(0.0);
        set_xy(&mut x_step, Keypoint::LeftAnkle, 405.0, 500.0);

        let mut balanced = standing_frame(0.0);
        set_xy(&mut balanced, Keypoint::LeftAnkle, 250.0, 500.0);
        set_xy(&mut balanced, Keypoint::RightAnkle, 370.0, 500.0);

        let mut off_arm = standing_frame(0.0);
        set_xy(&mut off_arm, Keypoint::LeftWrist, 300.0, 180.0);

        let cases = [
            (EventKind::Reachback, reachback_frame(0.0, 80.0), 90.0),
            (EventKind::PowerPocket, pocket_frame(0.0), 60.0 + 40.0 / 3.0),
            (EventKind::Brace, brace, 80.0 + 40.0 / 3.0),
            (EventKind::Release, release_frame(0.0), 100.0),
            (EventKind::FollowThrough, standing_frame(0.0), 93.0),
            (EventKind::XStep, x_step, 75.0),
            (EventKind::BestBalance, balanced, 95.0),
            (EventKind::BestOffArm, off_arm, 62.5),
        ];

        for (kind, frame, expected) in cases {
            let ctx = FrameContext::new(&frame, None, 0, 1.0, &config);
            let candidate = Candidate::detect(kind, &ctx, &config)
                .unwrap_or_else(|| panic!("{kind:?} not detected"));
            assert!(
                (candidate.score() - expected).abs() < 1e-6,
                "{kind:?} scored {}",
                candidate.score()
            );
        }
    }

    #[test]
    fn test_low_confidence_wrist_leaves_slots_empty() {
        let config = AnalysisConfig::default();
        let mut frames = vec![reachback_frame(0.0, 80.0), release_frame(0.2)];
        let slots = observe_all(&frames, &config);
        assert!(slots.get(EventKind::Reachback).is_some());
        assert!(slots.get(EventKind::Release).is_some());

        for frame in &mut frames {
            hide(frame, Keypoint::RightWrist);
        }
        let slots = observe_all(&frames, &config);
        assert!(slots.get(EventKind::Reachback).is_none());
        assert!(slots.get(EventKind::Release).is_none());
        assert!(slots.get(EventKind::FollowThrough).is_none());
    }

    #[test]
    fn test_stored_events_pass_their_predicate() {
        let config = AnalysisConfig::default();
        let frames: Vec<Frame> = (0..20)
            .map(|i| match i % 4 {
                0 => reachback_frame(i as f64 * 0.05, 40.0 + i as f64 * 3.0),
                1 => pocket_frame(i as f64 * 0.05),
                2 => release_frame(i as f64 * 0.05),
                _ => standing_frame(i as f64 * 0.05),
            })
            .collect();
        let slots = observe_all(&frames, &config);

        for kind in EventKind::ALL {
            if let Some(event) = slots.get(kind) {
                let index = event.frame_index;
                let previous = index.checked_sub(1).map(|p| &frames[p]);
                let ctx = FrameContext::new(&frames[index], previous, index, 0.95, &config);
                let candidate = Candidate::detect(kind, &ctx, &config).unwrap();
                assert!((candidate.score() - event.score).abs() < 1e-9);
                assert!(event.score >= kind.gallery_min(&config.events));
            }
        }
    }

    #[test]
    fn test_same_frame_cannot_satisfy_precedence() {
        let config = AnalysisConfig::default();
        let mut slots = EventSlots::new();
        let frame = reachback_frame(0.5, 80.0);
        let ctx = FrameContext::new(&frame, None, 0, 1.0, &config);
        slots.observe(&ctx, &config);
        assert!(slots.get(EventKind::Reachback).is_some());

        let pocket = pocket_frame(0.5);
        let ctx = FrameContext::new(&pocket, None, 1, 1.0, &config);
        let candidate = Candidate::detect(EventKind::PowerPocket, &ctx, &config).unwrap();
        assert!(!slots.offer(candidate, &config.events));

        let pocket = pocket_frame(0.6);
        let ctx = FrameContext::new(&pocket, None, 2, 1.0, &config);
        let candidate = Candidate::detect(EventKind::PowerPocket, &ctx, &config).unwrap();
        assert!(slots.offer(candidate, &config.events));
        assert!(
            slots.get(EventKind::PowerPocket).unwrap().timestamp
                > slots.get(EventKind::Reachback).unwrap().timestamp
        );
    }

    #[test]
    fn test_follow_through_needs_gap_after_release() {
        let config = AnalysisConfig::default();
        let frames = vec![release_frame(0.0), standing_frame(0.05), standing_frame(0.2)];
        let slots = observe_all(&frames, &config);

        let follow = slots.get(EventKind::FollowThrough).unwrap();
        assert_eq!(follow.timestamp, 0.2);
    }

    #[test]
    fn test_revalidation_drops_release_before_pocket() {
        let config = AnalysisConfig::default();
        let frames = vec![release_frame(0.0), pocket_frame(0.5)];
        let slots = observe_all(&frames, &config);

        // Release was accepted while the pocket slot was still empty
        assert!(slots.get(EventKind::Release).is_some());
        assert!(slots.get(EventKind::PowerPocket).is_some());

        let checked = slots.revalidated(&config.events);
        assert!(checked.get(EventKind::Release).is_none());
        assert!(checked.get(EventKind::PowerPocket).is_some());
        // Live slots are untouched
        assert!(slots.get(EventKind::Release).is_some());
    }

    #[test]
    fn test_gallery_threshold_filters_weak_brace() {
        let config = AnalysisConfig::default();
        let mut frame = standing_frame(0.0);
        set_xy(&mut frame, Keypoint::RightHip, 313.0, 300.0);
        set_xy(&mut frame, Keypoint::RightKnee, 330.0, 400.0);
        set_xy(&mut frame, Keypoint::RightAnkle, 320.0, 500.0);
        let ctx = FrameContext::new(&frame, None, 0, 1.0, &config);

        // Knee at ~165° counts as braced, but scores too low for the gallery
        assert!(brace_pose(&ctx.pose, &config.events).is_some());
        assert!(Candidate::detect(EventKind::Brace, &ctx, &config).is_none());
    }

    #[test]
    fn test_max_hip_rotation_needs_previous_frame() {
        let config = AnalysisConfig::default();
        let first = standing_frame(0.0);
        let mut second = standing_frame(0.1);
        set_xy(&mut second, Keypoint::RightHip, 270.0, 360.0);

        let alone = FrameContext::new(&second, None, 1, 1.0, &config);
        assert!(Candidate::detect(EventKind::MaxHipRotation, &alone, &config).is_none());

        let paired = FrameContext::new(&second, Some(&first), 1, 1.0, &config);
        let candidate = Candidate::detect(EventKind::MaxHipRotation, &paired, &config).unwrap();
        assert_eq!(candidate.score(), 100.0);
    }

    #[test]
    fn test_to_map_lists_every_kind() {
        let map = EventSlots::new().to_map();
        assert_eq!(map.len(), EventKind::COUNT);
        assert!(map.values().all(Option::is_none));
    }
}
