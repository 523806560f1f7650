//! Fundamental types for throw analysis: keypoints, frames and sides.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Unique identifier for an analysis session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// 17-joint skeletal keypoint definition (COCO format)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Keypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Keypoint {
    pub const COUNT: usize = 17;

    pub const ALL: [Keypoint; Keypoint::COUNT] = [
        Keypoint::Nose,
        Keypoint::LeftEye,
        Keypoint::RightEye,
        Keypoint::LeftEar,
        Keypoint::RightEar,
        Keypoint::LeftShoulder,
        Keypoint::RightShoulder,
        Keypoint::LeftElbow,
        Keypoint::RightElbow,
        Keypoint::LeftWrist,
        Keypoint::RightWrist,
        Keypoint::LeftHip,
        Keypoint::RightHip,
        Keypoint::LeftKnee,
        Keypoint::RightKnee,
        Keypoint::LeftAnkle,
        Keypoint::RightAnkle,
    ];

    pub fn from_index(idx: u8) -> Option<Self> {
        Self::ALL.get(idx as usize).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Body side, used to pick the throwing arm and the brace leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn shoulder(self) -> Keypoint {
        match self {
            Side::Left => Keypoint::LeftShoulder,
            Side::Right => Keypoint::RightShoulder,
        }
    }

    pub fn elbow(self) -> Keypoint {
        match self {
            Side::Left => Keypoint::LeftElbow,
            Side::Right => Keypoint::RightElbow,
        }
    }

    pub fn wrist(self) -> Keypoint {
        match self {
            Side::Left => Keypoint::LeftWrist,
            Side::Right => Keypoint::RightWrist,
        }
    }

    pub fn hip(self) -> Keypoint {
        match self {
            Side::Left => Keypoint::LeftHip,
            Side::Right => Keypoint::RightHip,
        }
    }

    pub fn knee(self) -> Keypoint {
        match self {
            Side::Left => Keypoint::LeftKnee,
            Side::Right => Keypoint::RightKnee,
        }
    }

    pub fn ankle(self) -> Keypoint {
        match self {
            Side::Left => Keypoint::LeftAnkle,
            Side::Right => Keypoint::RightAnkle,
        }
    }
}

/// Direction of the throw along the image x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrowDirection {
    LeftToRight,
    RightToLeft,
}

impl ThrowDirection {
    /// Sign applied to x differences so that positive means "forward"
    pub fn sign(self) -> f64 {
        match self {
            ThrowDirection::LeftToRight => 1.0,
            ThrowDirection::RightToLeft => -1.0,
        }
    }
}

/// A single keypoint estimate as produced by the pose model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeypointObservation {
    pub x: f64,
    pub y: f64,
    /// Detection confidence in [0, 1]
    pub confidence: f64,
}

impl KeypointObservation {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Usable only when strictly above the gate
    pub fn is_usable(&self, gate: f64) -> bool {
        self.confidence > gate
    }

    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// One timestamped pose observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds from the start of the recording
    pub timestamp: f64,
    pub keypoints: [KeypointObservation; Keypoint::COUNT],
}

impl Frame {
    pub fn new(timestamp: f64, keypoints: [KeypointObservation; Keypoint::COUNT]) -> Self {
        Self {
            timestamp,
            keypoints,
        }
    }

    /// Build a frame from a slice, validating the keypoint count
    pub fn from_observations(timestamp: f64, observations: &[KeypointObservation]) -> Result<Self> {
        let keypoints: [KeypointObservation; Keypoint::COUNT] =
            observations.try_into().map_err(|_| Error::KeypointCount {
                expected: Keypoint::COUNT,
                actual: observations.len(),
            })?;

        Ok(Self::new(timestamp, keypoints))
    }

    /// Build a frame from flat `(x, y, confidence)` triplets
    pub fn from_flat(timestamp: f64, data: &[f64]) -> Result<Self> {
        if data.len() != Keypoint::COUNT * 3 {
            return Err(Error::KeypointCount {
                expected: Keypoint::COUNT,
                actual: data.len() / 3,
            });
        }

        let observations: Vec<KeypointObservation> = data
            .chunks_exact(3)
            .map(|c| KeypointObservation::new(c[0], c[1], c[2]))
            .collect();

        Self::from_observations(timestamp, &observations)
    }

    pub fn get(&self, keypoint: Keypoint) -> &KeypointObservation {
        &self.keypoints[keypoint.index()]
    }

    pub fn set(&mut self, keypoint: Keypoint, observation: KeypointObservation) {
        self.keypoints[keypoint.index()] = observation;
    }

    /// Number of keypoints passing the confidence gate
    pub fn usable_count(&self, gate: f64) -> usize {
        self.keypoints.iter().filter(|k| k.is_usable(gate)).count()
    }

    /// Confidence-gated view used by every feature extractor
    pub fn view(&self, gate: f64) -> PoseView<'_> {
        PoseView { frame: self, gate }
    }
}

/// Read-only view of a frame that hides keypoints below the confidence gate
#[derive(Debug, Clone, Copy)]
pub struct PoseView<'a> {
    frame: &'a Frame,
    gate: f64,
}

impl<'a> PoseView<'a> {
    pub fn frame(&self) -> &'a Frame {
        self.frame
    }

    pub fn timestamp(&self) -> f64 {
        self.frame.timestamp
    }

    /// Position of a keypoint, or `None` when it is not usable
    pub fn get(&self, keypoint: Keypoint) -> Option<Point2<f64>> {
        let kp = self.frame.get(keypoint);
        kp.is_usable(self.gate).then(|| kp.point())
    }

    pub fn pair(&self, a: Keypoint, b: Keypoint) -> Option<(Point2<f64>, Point2<f64>)> {
        Some((self.get(a)?, self.get(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_roundtrip() {
        for i in 0..Keypoint::COUNT as u8 {
            let kp = Keypoint::from_index(i).unwrap();
            assert_eq!(kp as u8, i);
        }
        assert_eq!(Keypoint::from_index(17), None);
    }

    #[test]
    fn test_side_accessors() {
        assert_eq!(Side::Right.wrist(), Keypoint::RightWrist);
        assert_eq!(Side::Right.opposite().shoulder(), Keypoint::LeftShoulder);
        assert_eq!(Side::Left.ankle(), Keypoint::LeftAnkle);
    }

    #[test]
    fn test_frame_from_observations_validates_count() {
        let short = vec![KeypointObservation::default(); 16];
        assert_eq!(
            Frame::from_observations(0.0, &short),
            Err(Error::KeypointCount {
                expected: 17,
                actual: 16
            })
        );

        let full = vec![KeypointObservation::new(1.0, 2.0, 0.9); 17];
        assert!(Frame::from_observations(0.0, &full).is_ok());
    }

    #[test]
    fn test_frame_from_flat() {
        let mut data = vec![0.0; 51];
        data[Keypoint::RightWrist.index() * 3] = 120.0;
        data[Keypoint::RightWrist.index() * 3 + 1] = 80.0;
        data[Keypoint::RightWrist.index() * 3 + 2] = 0.8;

        let frame = Frame::from_flat(0.5, &data).unwrap();
        let wrist = frame.get(Keypoint::RightWrist);
        assert_eq!(wrist.x, 120.0);
        assert_eq!(wrist.y, 80.0);
        assert!(Frame::from_flat(0.5, &data[..50]).is_err());
    }

    #[test]
    fn test_confidence_gate_is_exclusive() {
        let mut frame = Frame::new(0.0, [KeypointObservation::default(); Keypoint::COUNT]);
        frame.set(Keypoint::Nose, KeypointObservation::new(1.0, 1.0, 0.3));
        frame.set(Keypoint::LeftEye, KeypointObservation::new(1.0, 1.0, 0.31));

        let view = frame.view(0.3);
        assert!(view.get(Keypoint::Nose).is_none());
        assert!(view.get(Keypoint::LeftEye).is_some());
        assert_eq!(frame.usable_count(0.3), 1);
    }
}
