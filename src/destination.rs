use serde::{Deserialize, Serialize};

use crate::error::{ArmError, ArmResult};
use crate::joint::{check_angle, Joint};

/// Sorting drop-off location.  The remote side identifies these by colour index 0-3.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum Destination {
    LeftNear,
    LeftFar,
    RightNear,
    RightFar,
}

impl Destination {
    pub const ALL: [Destination; 4] = [
        Destination::LeftNear,
        Destination::LeftFar,
        Destination::RightNear,
        Destination::RightFar,
    ];

    pub fn colour(self) -> u8 {
        match self {
            Destination::LeftNear => 0,
            Destination::LeftFar => 1,
            Destination::RightNear => 2,
            Destination::RightFar => 3,
        }
    }
}

impl TryFrom<u8> for Destination {
    type Error = ArmError;

    fn try_from(colour: u8) -> ArmResult<Self> {
        Destination::ALL
            .into_iter()
            .find(|d| d.colour() == colour)
            .ok_or(ArmError::UnknownDestination(colour))
    }
}

/// Shoulder, elbow and wrist angles for one arm configuration over a pile.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub shoulder: u8,
    pub elbow: u8,
    pub wrist: u8,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct DestinationSpot {
    pub base: u8,
    /// Where the arm goes with the object still held.
    pub reach: Waypoint,
    /// Where the gripper opens.
    pub release: Waypoint,
}

impl DestinationSpot {
    fn validate(&self) -> ArmResult<()> {
        check_angle(Some(Joint::Base), self.base)?;
        for waypoint in [self.reach, self.release] {
            check_angle(Some(Joint::Shoulder), waypoint.shoulder)?;
            check_angle(Some(Joint::Elbow), waypoint.elbow)?;
            check_angle(Some(Joint::WristVertical), waypoint.wrist)?;
        }
        Ok(())
    }
}

const BASE_LEFT_PILE: u8 = 0;
const BASE_RIGHT_PILE: u8 = 180;

const NEAR_PILE: Waypoint = Waypoint { shoulder: 90, elbow: 35, wrist: 20 };
const FAR_PILE_REACH: Waypoint = Waypoint { shoulder: 40, elbow: 70, wrist: 20 };
const FAR_PILE_RELEASE: Waypoint = Waypoint { shoulder: 40, elbow: 70, wrist: 40 };

/// One spot per [`Destination`]; having a field for each makes a partial table unrepresentable.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct DestinationTable {
    pub left_near: DestinationSpot,
    pub left_far: DestinationSpot,
    pub right_near: DestinationSpot,
    pub right_far: DestinationSpot,
}

impl Default for DestinationTable {
    fn default() -> Self {
        Self {
            left_near: DestinationSpot { base: BASE_LEFT_PILE, reach: NEAR_PILE, release: NEAR_PILE },
            left_far: DestinationSpot {
                base: BASE_LEFT_PILE,
                reach: FAR_PILE_REACH,
                release: FAR_PILE_RELEASE,
            },
            right_near: DestinationSpot { base: BASE_RIGHT_PILE, reach: NEAR_PILE, release: NEAR_PILE },
            right_far: DestinationSpot {
                base: BASE_RIGHT_PILE,
                reach: FAR_PILE_REACH,
                release: FAR_PILE_RELEASE,
            },
        }
    }
}

impl DestinationTable {
    pub fn spot(&self, destination: Destination) -> &DestinationSpot {
        match destination {
            Destination::LeftNear => &self.left_near,
            Destination::LeftFar => &self.left_far,
            Destination::RightNear => &self.right_near,
            Destination::RightFar => &self.right_far,
        }
    }

    pub fn validate(&self) -> ArmResult<()> {
        for destination in Destination::ALL {
            self.spot(destination).validate()?;
        }
        Ok(())
    }
}
