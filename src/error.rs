use thiserror::Error;

use crate::joint::{Joint, Pose, MAX_ANGLE};
use crate::sequencer::PickPhase;
use crate::servo_hal::HalError;

#[derive(Error, Debug)]
pub enum ArmError {
    #[error("angle {angle} is outside 0..={MAX_ANGLE} (joint: {joint:?})")]
    OutOfRangeAngle { joint: Option<Joint>, angle: u8 },
    #[error("gave up converging on [{target}] after {ticks} ticks")]
    UnreachableTarget { target: Pose, ticks: u32 },
    #[error("arm has not been initialized")]
    NotInitialized,
    #[error("invalid zone table: {0}")]
    InvalidZoneTable(String),
    #[error("unknown destination colour {0}")]
    UnknownDestination(u8),
    #[error("pick aborted during {phase:?}: {source}")]
    SequenceAborted {
        phase: PickPhase,
        #[source]
        source: Box<ArmError>,
    },
    #[error("arm task is no longer running")]
    TaskGone,
    #[error(transparent)]
    Hal(#[from] HalError),
}

pub type ArmResult<T> = Result<T, ArmError>;
