//! Grasp depth planning.  The shoulder elevation needed to reach an object approximates how far
//! it sits from the base, and each distance band gets its own wrist angle for the grab.

use serde::{Deserialize, Serialize};

use crate::error::{ArmError, ArmResult};
use crate::joint::{check_angle, Joint};

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub struct ZoneBand {
    /// Inclusive upper bound on the shoulder angle.
    pub max_shoulder: u8,
    pub wrist: u8,
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ZoneTable {
    bands: Vec<ZoneBand>,
    /// Wrist angle for anything past the last band.
    under: u8,
}

/// The two fourth-band thresholds found on the arm's firmware branches.  Which one is correct has
/// not been settled, so both stay selectable.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Serialize, Deserialize, clap::ArgEnum)]
#[serde(rename_all = "snake_case")]
pub enum ZoneVariant {
    /// Fourth band ends at 65 degrees.
    #[default]
    Narrow,
    /// Fourth band ends at 75 degrees.
    Wide,
}

const WRIST_GRAB_FAR: u8 = 10;
const WRIST_GRAB_ZONE_2: u8 = 23;
const WRIST_GRAB_ZONE_1: u8 = 32;
const WRIST_GRAB_ZONE_0: u8 = 35;
const WRIST_GRAB_UNDER: u8 = 18;

impl ZoneVariant {
    pub fn table(self) -> ZoneTable {
        let fourth_bound = match self {
            ZoneVariant::Narrow => 65,
            ZoneVariant::Wide => 75,
        };
        ZoneTable {
            bands: vec![
                ZoneBand { max_shoulder: 35, wrist: WRIST_GRAB_FAR },
                ZoneBand { max_shoulder: 45, wrist: WRIST_GRAB_ZONE_2 },
                ZoneBand { max_shoulder: 55, wrist: WRIST_GRAB_ZONE_1 },
                ZoneBand { max_shoulder: fourth_bound, wrist: WRIST_GRAB_ZONE_0 },
            ],
            under: WRIST_GRAB_UNDER,
        }
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        ZoneVariant::default().table()
    }
}

impl ZoneTable {
    pub fn new(bands: Vec<ZoneBand>, under: u8) -> ArmResult<Self> {
        let table = Self { bands, under };
        table.validate()?;
        Ok(table)
    }

    pub fn bands(&self) -> &[ZoneBand] {
        &self.bands
    }

    pub fn under(&self) -> u8 {
        self.under
    }

    pub fn validate(&self) -> ArmResult<()> {
        check_angle(Some(Joint::WristVertical), self.under)?;
        let mut previous: Option<u8> = None;
        for band in &self.bands {
            check_angle(Some(Joint::Shoulder), band.max_shoulder)?;
            check_angle(Some(Joint::WristVertical), band.wrist)?;
            if let Some(previous) = previous {
                if band.max_shoulder <= previous {
                    return Err(ArmError::InvalidZoneTable(format!(
                        "bound {} does not follow {previous}",
                        band.max_shoulder
                    )));
                }
            }
            previous = Some(band.max_shoulder);
        }
        Ok(())
    }

    /// First band whose bound is `>= shoulder` wins; anything past the last band gets the "under"
    /// angle.
    pub fn grasp_depth(&self, shoulder: u8) -> ArmResult<u8> {
        let shoulder = check_angle(Some(Joint::Shoulder), shoulder)?;
        Ok(self
            .bands
            .iter()
            .find(|band| shoulder <= band.max_shoulder)
            .map(|band| band.wrist)
            .unwrap_or(self.under))
    }
}
