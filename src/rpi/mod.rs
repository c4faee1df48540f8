pub mod servo_hal_rpi;
