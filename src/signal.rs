//! Angle to servo drive value mapping.
//!
//! The drive value is a timer compare count: with the 8400-count, 20ms PWM period the servos are
//! clocked at, 210 counts is a 0.5ms pulse (0 degrees) and 1050 counts is 2.5ms (180 degrees).

use std::time::Duration;

use crate::error::ArmResult;
use crate::joint::{check_angle, MAX_ANGLE};

pub const MIN_SIGNAL: u16 = 210;
pub const MAX_SIGNAL: u16 = 1050;

pub const PWM_PERIOD: Duration = Duration::from_millis(20);
pub const PWM_PERIOD_COUNTS: u64 = 8400;

/// Rejects angles above 180 rather than clamping them.
pub fn to_signal(angle: u8) -> ArmResult<u16> {
    let angle = check_angle(None, angle)?;
    let span = u32::from(MAX_SIGNAL - MIN_SIGNAL);
    let offset = u32::from(angle) * span / u32::from(MAX_ANGLE);
    // offset <= span, so this always fits.
    Ok(MIN_SIGNAL + offset as u16)
}

/// High time of one PWM period for the given drive value.
pub fn pulse_width(drive_value: u16) -> Duration {
    let period_ns = PWM_PERIOD.as_nanos() as u64;
    Duration::from_nanos(u64::from(drive_value) * period_ns / PWM_PERIOD_COUNTS)
}

#[cfg(test)]
mod tests {
    use crate::error::ArmError;

    use super::*;

    #[test]
    fn test_endpoints() {
        assert_eq!(to_signal(0).unwrap(), 210);
        assert_eq!(to_signal(180).unwrap(), 1050);
    }

    #[test]
    fn test_truncating_division() {
        assert_eq!(to_signal(90).unwrap(), 630);
        // 1 * 840 / 180 = 4.67
        assert_eq!(to_signal(1).unwrap(), 214);
        // 35 * 840 / 180 = 163.33
        assert_eq!(to_signal(35).unwrap(), 373);
    }

    #[test]
    fn test_monotonic_over_full_range() {
        let mut last = to_signal(0).unwrap();
        for angle in 1..=MAX_ANGLE {
            let next = to_signal(angle).unwrap();
            assert!(next >= last, "{angle}: {next} < {last}");
            last = next;
        }
    }

    #[test]
    fn test_rejects_above_180() {
        assert!(matches!(
            to_signal(181),
            Err(ArmError::OutOfRangeAngle { joint: None, angle: 181 })
        ));
    }

    #[test]
    fn test_pulse_width_spans_half_to_two_and_a_half_ms() {
        assert_eq!(pulse_width(MIN_SIGNAL), Duration::from_micros(500));
        assert_eq!(pulse_width(MAX_SIGNAL), Duration::from_micros(2500));
    }
}
