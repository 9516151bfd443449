//! Linux hardware driver.
//!
//! Line sensors are read through the sysfs GPIO interface and frames are
//! written to the motor controller through an `i2c-dev` character device.

mod gpio;
mod i2c;

pub use gpio::SysfsGpioSensors;
pub use i2c::I2cBus;

use tracer_common::config::TracerConfig;
use tracer_common::hal::driver::{HalError, HardwareHandles};
use tracing::info;

/// Factory function to open the Linux hardware.
///
/// The sensors are opened before the bus. A sensor line that cannot be set
/// up is `HalError::InitFailed`; a bus that cannot be opened is
/// `HalError::TransportUnavailable`. Both are fatal to the caller.
pub fn create_driver(config: &TracerConfig) -> Result<HardwareHandles, HalError> {
    let sensors = SysfsGpioSensors::open(&config.sensors.gpio_root, config.sensors.pins)?;
    let bus = I2cBus::open(&config.bus.device, config.bus.address)?;
    info!(
        "Linux driver: motor controller 0x{:02x} on {}",
        bus.address(),
        bus.device().display()
    );
    Ok(HardwareHandles {
        sensors: Box::new(sensors),
        bus: Box::new(bus),
    })
}
