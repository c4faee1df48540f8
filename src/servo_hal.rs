use thiserror::Error;

use crate::joint::Joint;

#[derive(Error, PartialEq, Clone, Debug)]
pub enum HalError {
    #[error("{0}")]
    DeviceNotConnected(String),
    #[error("{0}")]
    InternalError(String),
}

pub type HalResult<T> = Result<T, HalError>;

/// One signal channel per joint, addressed by [`Joint`].
pub trait ServoHal {
    /// Enable motor power and start every joint's signal channel.  Called once before any motion.
    fn bring_up(&mut self) -> HalResult<()>;

    /// Apply a drive value (as produced by [`crate::signal::to_signal`]) to a joint's channel.
    fn write_signal(&mut self, joint: Joint, drive_value: u16) -> HalResult<()>;

    fn dump(&self) -> HalResult<()>;
}
