//! `i2c-dev` bus handle.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use tracer_common::hal::driver::{BusHandle, HalError};
use tracing::info;

/// `I2C_SLAVE` request from `<linux/i2c-dev.h>`.
const I2C_SLAVE: u16 = 0x0703;

nix::ioctl_write_int_bad!(
    /// Bind the fd to a peripheral address.
    i2c_set_slave_address,
    I2C_SLAVE
);

/// Open `i2c-dev` device bound to one peripheral address.
#[derive(Debug)]
pub struct I2cBus {
    file: Option<File>,
    device: PathBuf,
    address: u16,
}

impl I2cBus {
    /// Open `device` and select the peripheral at `address`.
    ///
    /// # Errors
    /// `HalError::TransportUnavailable` if the device cannot be opened or
    /// the address cannot be selected.
    pub fn open(device: &Path, address: u16) -> Result<Self, HalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(device)
            .map_err(|e| {
                HalError::TransportUnavailable(format!(
                    "failed to access {}: {}",
                    device.display(),
                    e
                ))
            })?;
        info!("I2C: connected to {}", device.display());

        info!("I2C: acquiring bus to 0x{:x}", address);
        // SAFETY: the fd is open for the lifetime of `file`; I2C_SLAVE takes
        // the address by value.
        unsafe { i2c_set_slave_address(file.as_raw_fd(), std::ffi::c_int::from(address)) }.map_err(|e| {
            HalError::TransportUnavailable(format!(
                "failed to acquire bus access to 0x{:x} on {}: {}",
                address,
                device.display(),
                e
            ))
        })?;

        Ok(Self {
            file: Some(file),
            device: device.to_path_buf(),
            address,
        })
    }

    /// Device path of the bus.
    pub fn device(&self) -> &Path {
        &self.device
    }

    /// Selected peripheral address.
    pub fn address(&self) -> u16 {
        self.address
    }
}

impl BusHandle for I2cBus {
    fn name(&self) -> &'static str {
        "i2c-dev"
    }

    fn write(&mut self, frame: &[u8]) -> Result<usize, HalError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| HalError::CommunicationError("bus is closed".to_string()))?;
        // One write() per frame: i2c-dev turns it into a single bus transaction.
        file.write(frame).map_err(|e| {
            HalError::CommunicationError(format!(
                "failed to write to {}: {}",
                self.device.display(),
                e
            ))
        })
    }

    fn close(&mut self) -> Result<(), HalError> {
        if self.file.take().is_some() {
            info!("I2C: closed {}", self.device.display());
        }
        Ok(())
    }
}
