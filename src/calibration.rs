use serde::{Deserialize, Serialize};

use crate::destination::DestinationTable;
use crate::error::ArmResult;
use crate::joint::{check_angle, Joint, Pose};
use crate::zone::ZoneTable;

/// Hand-tuned angles for one physical arm.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Folded rest position.  The arm is assumed to be sitting here at power-on.
    pub fold: Pose,
    pub wrist_raised: u8,
    /// Wrist rotation held while reaching for and placing objects.
    pub wrist_rotation: u8,
    pub gripper_open: u8,
    pub gripper_closed: u8,
    pub zones: ZoneTable,
    pub destinations: DestinationTable,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            fold: Pose::new(0, 100, 35, 90, 90, 40),
            wrist_raised: 90,
            wrist_rotation: 90,
            gripper_open: 15,
            gripper_closed: 70,
            zones: ZoneTable::default(),
            destinations: DestinationTable::default(),
        }
    }
}

impl Calibration {
    pub fn validate(&self) -> ArmResult<()> {
        self.fold.validate()?;
        check_angle(Some(Joint::WristVertical), self.wrist_raised)?;
        check_angle(Some(Joint::WristRotation), self.wrist_rotation)?;
        check_angle(Some(Joint::Gripper), self.gripper_open)?;
        check_angle(Some(Joint::Gripper), self.gripper_closed)?;
        self.zones.validate()?;
        self.destinations.validate()
    }

    /// What the joint state is seeded with before any motion.
    pub fn seed_pose(&self) -> Pose {
        self.fold
    }

    pub fn home_pose(&self) -> Pose {
        self.fold.with(Joint::Gripper, self.gripper_open)
    }
}
