use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ArmError, ArmResult};

/// Largest angle any actuator accepts, in degrees.
pub const MAX_ANGLE: u8 = 180;

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum Joint {
    Base,
    Shoulder,
    Elbow,
    WristVertical,
    WristRotation,
    Gripper,
}

impl Joint {
    /// Every joint, in the order the synchronizer visits them on each tick.
    pub const ALL: [Joint; 6] = [
        Joint::Base,
        Joint::Shoulder,
        Joint::Elbow,
        Joint::WristVertical,
        Joint::WristRotation,
        Joint::Gripper,
    ];
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub fn check_angle(joint: Option<Joint>, angle: u8) -> ArmResult<u8> {
    if angle > MAX_ANGLE {
        return Err(ArmError::OutOfRangeAngle { joint, angle });
    }
    Ok(angle)
}

/// A target angle for every joint of the arm.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct Pose {
    pub base: u8,
    pub shoulder: u8,
    pub elbow: u8,
    pub wrist_vertical: u8,
    pub wrist_rotation: u8,
    pub gripper: u8,
}

impl Pose {
    pub const fn new(
        base: u8,
        shoulder: u8,
        elbow: u8,
        wrist_vertical: u8,
        wrist_rotation: u8,
        gripper: u8,
    ) -> Self {
        Self { base, shoulder, elbow, wrist_vertical, wrist_rotation, gripper }
    }

    pub fn get(&self, joint: Joint) -> u8 {
        match joint {
            Joint::Base => self.base,
            Joint::Shoulder => self.shoulder,
            Joint::Elbow => self.elbow,
            Joint::WristVertical => self.wrist_vertical,
            Joint::WristRotation => self.wrist_rotation,
            Joint::Gripper => self.gripper,
        }
    }

    /// Copy of this pose with a single joint replaced.
    pub fn with(mut self, joint: Joint, angle: u8) -> Self {
        *self.slot_mut(joint) = angle;
        self
    }

    pub fn validate(&self) -> ArmResult<()> {
        for joint in Joint::ALL {
            check_angle(Some(joint), self.get(joint))?;
        }
        Ok(())
    }

    /// Largest per-joint distance to `other`, i.e. the number of ticks a convergence takes.
    pub fn distance_to(&self, other: &Pose) -> u8 {
        Joint::ALL
            .iter()
            .map(|&joint| self.get(joint).abs_diff(other.get(joint)))
            .max()
            .unwrap_or(0)
    }

    fn slot_mut(&mut self, joint: Joint) -> &mut u8 {
        match joint {
            Joint::Base => &mut self.base,
            Joint::Shoulder => &mut self.shoulder,
            Joint::Elbow => &mut self.elbow,
            Joint::WristVertical => &mut self.wrist_vertical,
            Joint::WristRotation => &mut self.wrist_rotation,
            Joint::Gripper => &mut self.gripper,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base={} shoulder={} elbow={} wrist_ver={} wrist_rot={} gripper={}",
            self.base, self.shoulder, self.elbow, self.wrist_vertical, self.wrist_rotation, self.gripper
        )
    }
}

/// Last angle each joint was told to hold.  Only the motion synchronizer writes to it; there is
/// no feedback from the actuators, so this is a model of what was commanded, not a measurement.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct JointState {
    angles: Pose,
}

impl JointState {
    pub(crate) fn seeded(pose: Pose) -> ArmResult<Self> {
        pose.validate()?;
        Ok(Self { angles: pose })
    }

    pub fn get(&self, joint: Joint) -> u8 {
        self.angles.get(joint)
    }

    pub fn pose(&self) -> Pose {
        self.angles
    }

    pub fn matches(&self, target: &Pose) -> bool {
        self.angles == *target
    }

    pub(crate) fn set(&mut self, joint: Joint, angle: u8) {
        *self.angles.slot_mut(joint) = angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_replaces_only_one_joint() {
        let pose = Pose::new(0, 100, 35, 90, 90, 40);
        let moved = pose.with(Joint::Gripper, 70);
        assert_eq!(moved, Pose::new(0, 100, 35, 90, 90, 70));
        assert_eq!(pose.gripper, 40);
    }

    #[test]
    fn test_validate_names_offending_joint() {
        let pose = Pose::new(0, 100, 200, 90, 90, 40);
        match pose.validate() {
            Err(ArmError::OutOfRangeAngle { joint, angle }) => {
                assert_eq!(joint, Some(Joint::Elbow));
                assert_eq!(angle, 200);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(Pose::new(180, 0, 180, 0, 180, 0).validate().is_ok());
    }

    #[test]
    fn test_distance_is_largest_joint_delta() {
        let a = Pose::new(0, 100, 35, 90, 90, 40);
        let b = Pose::new(90, 40, 70, 90, 90, 15);
        assert_eq!(a.distance_to(&b), 90);
        assert_eq!(a.distance_to(&a), 0);
    }
}
