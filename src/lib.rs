pub mod arm;
pub mod arm_task;
pub mod calibration;
pub mod command;
pub mod config;
pub mod destination;
pub mod error;
pub mod joint;
pub mod motion;
pub mod sequencer;
pub mod servo_hal;
pub mod servo_hal_factory;
pub mod servo_hal_mock;
pub mod signal;
pub mod zone;

#[cfg(all(feature = "rpi", target_os = "linux"))]
mod rpi;
