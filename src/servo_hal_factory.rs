use std::path::Path;

use log::info;

use crate::config::GpioPins;
#[cfg(all(feature = "rpi", target_os = "linux"))]
use crate::rpi::servo_hal_rpi::ServoHalRpi;
use crate::servo_hal::ServoHal;
use crate::servo_hal_mock::ServoHalMock;

const GPIO_DEVICE: &str = "/dev/gpiomem";

pub struct ServoHalFactory {
    force_mock: bool,
}

impl ServoHalFactory {
    pub fn new_maybe_mock(force_mock: bool) -> Self {
        Self { force_mock }
    }

    pub fn create_hal(&self, pins: &GpioPins) -> anyhow::Result<Box<dyn ServoHal + Send>> {
        if !self.force_mock && Path::new(GPIO_DEVICE).exists() {
            self.create_gpio_hal(pins)
        } else {
            info!("Using mock servos");
            Ok(Box::new(ServoHalMock::default()))
        }
    }

    #[cfg(all(feature = "rpi", target_os = "linux"))]
    fn create_gpio_hal(&self, pins: &GpioPins) -> anyhow::Result<Box<dyn ServoHal + Send>> {
        info!("Using GPIO servos: {pins:?}");
        Ok(Box::new(ServoHalRpi::new(pins)?))
    }

    #[cfg(not(all(feature = "rpi", target_os = "linux")))]
    fn create_gpio_hal(&self, _pins: &GpioPins) -> anyhow::Result<Box<dyn ServoHal + Send>> {
        log::warn!("{GPIO_DEVICE} exists but this build has no GPIO support (enable the `rpi` feature), using mock servos");
        Ok(Box::new(ServoHalMock::default()))
    }
}
