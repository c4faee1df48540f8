use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::joint::MAX_ANGLE;
use crate::motion::{DEFAULT_MAX_TICKS, DEFAULT_TICK_INTERVAL};

#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmConfig {
    pub tick_interval_ms: u64,
    /// Settle time between joints during the power-on alignment.
    pub alignment_delay_ms: u64,
    pub max_ticks_per_move: u32,
    pub calibration: Calibration,
    pub gpio: GpioPins,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            alignment_delay_ms: 200,
            max_ticks_per_move: DEFAULT_MAX_TICKS,
            calibration: Calibration::default(),
            gpio: GpioPins::default(),
        }
    }
}

/// BCM pin numbers for the Raspberry Pi backend.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GpioPins {
    pub motor_enable: u8,
    pub base: u8,
    pub shoulder: u8,
    pub elbow: u8,
    pub wrist_vertical: u8,
    pub wrist_rotation: u8,
    pub gripper: u8,
}

impl Default for GpioPins {
    fn default() -> Self {
        Self {
            motor_enable: 5,
            base: 17,
            shoulder: 27,
            elbow: 22,
            wrist_vertical: 23,
            wrist_rotation: 24,
            gripper: 25,
        }
    }
}

impl ArmConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn alignment_delay(&self) -> Duration {
        Duration::from_millis(self.alignment_delay_ms)
    }

    pub fn load_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let config: ArmConfig = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate().with_context(|| format!("bad config in {}", path.display()))?;
        Ok(config)
    }

    /// A ceiling below the widest possible move would fail legal full-range moves.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.max_ticks_per_move >= u32::from(MAX_ANGLE),
            "max_ticks_per_move {} is below {}",
            self.max_ticks_per_move,
            MAX_ANGLE
        );
        self.calibration.validate()?;
        Ok(())
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::zone::ZoneVariant;

    use super::*;

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tick_interval_ms": 20, "calibration": {{ "gripper_closed": 65 }} }}"#).unwrap();

        let config = ArmConfig::load_json(file.path()).unwrap();

        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert_eq!(config.alignment_delay(), Duration::from_millis(200));
        assert_eq!(config.calibration.gripper_closed, 65);
        assert_eq!(config.calibration.gripper_open, 15);
        assert_eq!(config.gpio, GpioPins::default());
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arm.json");
        let mut config = ArmConfig::default();
        config.calibration.zones = ZoneVariant::Wide.table();

        config.save_json(&path).unwrap();

        assert_eq!(ArmConfig::load_json(&path).unwrap(), config);
    }

    #[test]
    fn test_out_of_range_calibration_is_refused() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "calibration": {{ "wrist_raised": 200 }} }}"#).unwrap();

        let err = ArmConfig::load_json(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("outside"));
    }

    #[test]
    fn test_tick_ceiling_below_full_swing_is_refused() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_ticks_per_move": 179 }}"#).unwrap();

        let err = ArmConfig::load_json(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("max_ticks_per_move 179"));

        let config = ArmConfig { max_ticks_per_move: 180, ..Default::default() };
        config.validate().unwrap();
    }
}
