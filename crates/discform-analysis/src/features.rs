//! Frame-level biomechanical features.
//!
//! [`ThrowPose`] wraps a confidence-gated frame together with the thrower's
//! handedness and direction. Every accessor returns `None` when one of the
//! joints it needs is below the confidence gate.

use discform_core::{
    angular_difference, distance, extension_ratio, joint_angle, line_angle, line_separation_deg,
    midpoint, AnalysisConfig, Frame, Keypoint, PoseView, Side, ThrowDirection,
};
use nalgebra::Point2;

/// Shoulder, elbow and wrist of one arm
#[derive(Debug, Clone, Copy)]
pub struct Arm {
    pub shoulder: Point2<f64>,
    pub elbow: Point2<f64>,
    pub wrist: Point2<f64>,
}

/// A frame seen from the thrower's point of view
#[derive(Debug, Clone, Copy)]
pub struct ThrowPose<'a> {
    view: PoseView<'a>,
    side: Side,
    brace: Side,
    direction: ThrowDirection,
}

impl<'a> ThrowPose<'a> {
    pub fn new(frame: &'a Frame, config: &AnalysisConfig) -> Self {
        Self {
            view: frame.view(config.confidence_gate),
            side: config.throwing_side,
            brace: config.brace_leg(),
            direction: config.throw_direction,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.view.timestamp()
    }

    pub fn frame(&self) -> &'a Frame {
        self.view.frame()
    }

    fn get(&self, keypoint: Keypoint) -> Option<Point2<f64>> {
        self.view.get(keypoint)
    }

    /// Signed horizontal offset of `a` relative to `b`; positive is forward
    pub fn forward(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        self.direction.sign() * (a.x - b.x)
    }

    pub fn throwing_arm(&self) -> Option<Arm> {
        Some(Arm {
            shoulder: self.get(self.side.shoulder())?,
            elbow: self.get(self.side.elbow())?,
            wrist: self.get(self.side.wrist())?,
        })
    }

    pub fn arm_extension(&self) -> Option<f64> {
        let arm = self.throwing_arm()?;
        extension_ratio(&arm.shoulder, &arm.elbow, &arm.wrist)
    }

    pub fn elbow_angle(&self) -> Option<f64> {
        let arm = self.throwing_arm()?;
        Some(joint_angle(&arm.shoulder, &arm.elbow, &arm.wrist))
    }

    /// Shoulder-to-wrist distance of the throwing arm
    pub fn arm_length(&self) -> Option<f64> {
        let (shoulder, wrist) = self.view.pair(self.side.shoulder(), self.side.wrist())?;
        Some(distance(&shoulder, &wrist))
    }

    pub fn wrist_forward_of_shoulder(&self) -> Option<f64> {
        let (wrist, shoulder) = self.view.pair(self.side.wrist(), self.side.shoulder())?;
        Some(self.forward(&wrist, &shoulder))
    }

    pub fn wrist_forward_of_hip(&self) -> Option<f64> {
        let (wrist, hip) = self.view.pair(self.side.wrist(), self.side.hip())?;
        Some(self.forward(&wrist, &hip))
    }

    /// Throwing wrist relative to the non-throwing shoulder
    pub fn wrist_forward_of_off_shoulder(&self) -> Option<f64> {
        let (wrist, shoulder) = self
            .view
            .pair(self.side.wrist(), self.side.opposite().shoulder())?;
        Some(self.forward(&wrist, &shoulder))
    }

    /// Horizontal shoulder-hip offset on the throwing side
    pub fn posture_offset(&self) -> Option<f64> {
        let (shoulder, hip) = self.view.pair(self.side.shoulder(), self.side.hip())?;
        Some((shoulder.x - hip.x).abs())
    }

    pub fn shoulder_width(&self) -> Option<f64> {
        let (l, r) = self.view.pair(Keypoint::LeftShoulder, Keypoint::RightShoulder)?;
        Some((l.x - r.x).abs())
    }

    pub fn hip_width(&self) -> Option<f64> {
        let (l, r) = self.view.pair(Keypoint::LeftHip, Keypoint::RightHip)?;
        Some((l.x - r.x).abs())
    }

    pub fn stance_width(&self) -> Option<f64> {
        let (l, r) = self.view.pair(Keypoint::LeftAnkle, Keypoint::RightAnkle)?;
        Some((l.x - r.x).abs())
    }

    pub fn hip_midpoint(&self) -> Option<Point2<f64>> {
        let (l, r) = self.view.pair(Keypoint::LeftHip, Keypoint::RightHip)?;
        Some(midpoint(&l, &r))
    }

    pub fn shoulder_midpoint(&self) -> Option<Point2<f64>> {
        let (l, r) = self.view.pair(Keypoint::LeftShoulder, Keypoint::RightShoulder)?;
        Some(midpoint(&l, &r))
    }

    pub fn ankle_midpoint(&self) -> Option<Point2<f64>> {
        let (l, r) = self.view.pair(Keypoint::LeftAnkle, Keypoint::RightAnkle)?;
        Some(midpoint(&l, &r))
    }

    /// Angle of the left-to-right hip line, in radians
    pub fn hip_line_angle(&self) -> Option<f64> {
        let (l, r) = self.view.pair(Keypoint::LeftHip, Keypoint::RightHip)?;
        Some(line_angle(&l, &r))
    }

    pub fn hip_shoulder_separation(&self) -> Option<f64> {
        let (lh, rh) = self.view.pair(Keypoint::LeftHip, Keypoint::RightHip)?;
        let (ls, rs) = self.view.pair(Keypoint::LeftShoulder, Keypoint::RightShoulder)?;
        Some(line_separation_deg(&lh, &rh, &ls, &rs))
    }

    /// Knee angle of the brace leg, in degrees
    pub fn brace_knee_angle(&self) -> Option<f64> {
        let hip = self.get(self.brace.hip())?;
        let knee = self.get(self.brace.knee())?;
        let ankle = self.get(self.brace.ankle())?;
        Some(joint_angle(&hip, &knee, &ankle))
    }

    /// How far the brace ankle sits forward of its knee
    pub fn brace_ankle_forward(&self) -> Option<f64> {
        let (ankle, knee) = self.view.pair(self.brace.ankle(), self.brace.knee())?;
        Some(self.forward(&ankle, &knee))
    }

    /// Height of the throwing wrist above the hip midline (image y grows down)
    pub fn wrist_height(&self) -> Option<f64> {
        let wrist = self.get(self.side.wrist())?;
        let hips = self.hip_midpoint()?;
        Some(hips.y - wrist.y)
    }

    /// Vertical rise of the throwing wrist above its elbow
    pub fn wrist_rise_over_elbow(&self) -> Option<f64> {
        let (wrist, elbow) = self.view.pair(self.side.wrist(), self.side.elbow())?;
        Some(elbow.y - wrist.y)
    }

    /// Horizontal distance between the throwing elbow and the throwing hip
    pub fn elbow_torso_distance(&self) -> Option<f64> {
        let (elbow, hip) = self.view.pair(self.side.elbow(), self.side.hip())?;
        Some((elbow.x - hip.x).abs())
    }

    pub fn elbow_forward_of_shoulder(&self) -> Option<f64> {
        let (elbow, shoulder) = self.view.pair(self.side.elbow(), self.side.shoulder())?;
        Some(self.forward(&elbow, &shoulder))
    }

    /// How far the ankles have crossed relative to the hip order.
    ///
    /// Positive when the feet are crossed (X-step), negative when they are in
    /// the same left/right order as the hips.
    pub fn ankle_cross(&self) -> Option<f64> {
        let (lh, rh) = self.view.pair(Keypoint::LeftHip, Keypoint::RightHip)?;
        let (la, ra) = self.view.pair(Keypoint::LeftAnkle, Keypoint::RightAnkle)?;
        let hip_order = (lh.x - rh.x).signum();
        Some(-(la.x - ra.x) * hip_order)
    }

    /// Distance from the non-throwing wrist to the shoulder midpoint
    pub fn off_arm_distance(&self) -> Option<f64> {
        let wrist = self.get(self.side.opposite().wrist())?;
        let shoulders = self.shoulder_midpoint()?;
        Some(distance(&wrist, &shoulders))
    }

    /// Horizontal lean of the shoulders over the base of support
    pub fn balance_lean(&self) -> Option<f64> {
        let shoulders = self.shoulder_midpoint()?;
        let ankles = self.ankle_midpoint()?;
        Some((shoulders.x - ankles.x).abs())
    }
}

/// Absolute hip-line angle change between two frames, wrapped into [0, π]
pub fn hip_rotation_between(previous: &ThrowPose<'_>, current: &ThrowPose<'_>) -> Option<f64> {
    let before = previous.hip_line_angle()?;
    let after = current.hip_line_angle()?;
    Some(angular_difference(after, before).abs())
}
