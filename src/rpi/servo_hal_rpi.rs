use std::collections::HashMap;

use log::{debug, info};
use rppal::gpio::{Gpio, OutputPin};

use crate::config::GpioPins;
use crate::joint::Joint;
use crate::servo_hal::{HalError, HalResult, ServoHal};
use crate::signal::{pulse_width, PWM_PERIOD};

/// Servos driven from Raspberry Pi GPIO with software PWM, one pin per joint plus a motor power
/// enable line.
pub struct ServoHalRpi {
    motor_enable: OutputPin,
    channels: HashMap<Joint, OutputPin>,
    last_written: HashMap<Joint, u16>,
}

impl ServoHalRpi {
    pub fn new(pins: &GpioPins) -> HalResult<Self> {
        let gpio = Gpio::new()?;
        let motor_enable = gpio.get(pins.motor_enable)?.into_output_low();

        let mut channels = HashMap::new();
        for (joint, pin) in [
            (Joint::Base, pins.base),
            (Joint::Shoulder, pins.shoulder),
            (Joint::Elbow, pins.elbow),
            (Joint::WristVertical, pins.wrist_vertical),
            (Joint::WristRotation, pins.wrist_rotation),
            (Joint::Gripper, pins.gripper),
        ] {
            channels.insert(joint, gpio.get(pin)?.into_output_low());
        }

        Ok(Self {
            motor_enable,
            channels,
            last_written: HashMap::new(),
        })
    }
}

impl ServoHal for ServoHalRpi {
    fn bring_up(&mut self) -> HalResult<()> {
        info!("Enabling servo power on GPIO {}", self.motor_enable.pin());
        self.motor_enable.set_high();
        Ok(())
    }

    fn write_signal(&mut self, joint: Joint, drive_value: u16) -> HalResult<()> {
        let pin = self
            .channels
            .get_mut(&joint)
            .ok_or_else(|| HalError::DeviceNotConnected(format!("no pin for {joint}")))?;
        pin.set_pwm(PWM_PERIOD, pulse_width(drive_value))?;
        self.last_written.insert(joint, drive_value);
        Ok(())
    }

    fn dump(&self) -> HalResult<()> {
        debug!("motor_enable: GPIO {} high={}", self.motor_enable.pin(), self.motor_enable.is_set_high());
        for joint in Joint::ALL {
            if let Some(pin) = self.channels.get(&joint) {
                debug!("{joint}: GPIO {} drive={:?}", pin.pin(), self.last_written.get(&joint));
            }
        }
        Ok(())
    }
}

impl From<rppal::gpio::Error> for HalError {
    fn from(e: rppal::gpio::Error) -> Self {
        match e {
            rppal::gpio::Error::PinNotAvailable(pin) => {
                HalError::DeviceNotConnected(format!("GPIO {pin} is not available"))
            }
            other => HalError::InternalError(other.to_string()),
        }
    }
}
