//! Sysfs GPIO sensor source.
//!
//! Each sensor line is exported (if needed), configured as an input, and its
//! `value` file kept open; a read rewinds and reads one byte per line.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracer_common::consts::SENSOR_COUNT;
use tracer_common::hal::driver::{HalError, SensorSource};
use tracer_common::sensor::SensorState;
use tracing::{debug, info};

/// One exported input line.
#[derive(Debug)]
struct InputLine {
    pin: u32,
    value: File,
}

impl InputLine {
    fn open(root: &Path, pin: u32) -> Result<Self, HalError> {
        let line_dir = root.join(format!("gpio{pin}"));
        if !line_dir.exists() {
            debug!("Exporting GPIO {}", pin);
            fs::write(root.join("export"), pin.to_string()).map_err(|e| {
                HalError::InitFailed(format!("failed to export GPIO {pin}: {e}"))
            })?;
        }

        fs::write(line_dir.join("direction"), "in").map_err(|e| {
            HalError::InitFailed(format!("failed to set GPIO {pin} as input: {e}"))
        })?;

        let value = File::open(line_dir.join("value")).map_err(|e| {
            HalError::InitFailed(format!("failed to open GPIO {pin} value: {e}"))
        })?;

        Ok(Self { pin, value })
    }

    fn read(&mut self) -> Result<bool, HalError> {
        let mut buf = [0u8; 1];
        self.value
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.value.read_exact(&mut buf))
            .map_err(|e| HalError::SensorRead(format!("GPIO {}: {}", self.pin, e)))?;
        match buf[0] {
            b'0' => Ok(false),
            b'1' => Ok(true),
            other => Err(HalError::SensorRead(format!(
                "GPIO {}: unexpected value byte 0x{:02x}",
                self.pin, other
            ))),
        }
    }
}

/// Four line sensors on sysfs GPIO inputs.
#[derive(Debug)]
pub struct SysfsGpioSensors {
    lines: [InputLine; SENSOR_COUNT],
}

impl SysfsGpioSensors {
    /// Open the four lines `pins = [s1, s2, s3, s4]` below `root`.
    ///
    /// # Errors
    /// `HalError::InitFailed` if any line cannot be exported, configured or opened.
    pub fn open(root: &Path, pins: [u32; SENSOR_COUNT]) -> Result<Self, HalError> {
        let lines = [
            InputLine::open(root, pins[0])?,
            InputLine::open(root, pins[1])?,
            InputLine::open(root, pins[2])?,
            InputLine::open(root, pins[3])?,
        ];
        info!("GPIO: sensors on lines {:?} under {}", pins, root.display());
        Ok(Self { lines })
    }
}

impl SensorSource for SysfsGpioSensors {
    fn name(&self) -> &'static str {
        "sysfs-gpio"
    }

    fn read_sensors(&mut self) -> Result<SensorState, HalError> {
        let mut readings = [false; SENSOR_COUNT];
        for (reading, line) in readings.iter_mut().zip(self.lines.iter_mut()) {
            *reading = line.read()?;
        }
        Ok(SensorState::from(readings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PINS: [u32; SENSOR_COUNT] = [27, 22, 17, 4];

    /// Build an already-exported fake sysfs tree.
    fn fake_root(values: [&str; SENSOR_COUNT]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (pin, value) in PINS.iter().zip(values) {
            let line = dir.path().join(format!("gpio{pin}"));
            fs::create_dir(&line).unwrap();
            fs::write(line.join("value"), value).unwrap();
        }
        dir
    }

    fn set_value(root: &Path, pin: u32, value: &str) {
        fs::write(root.join(format!("gpio{pin}")).join("value"), value).unwrap();
    }

    #[test]
    fn reads_values_in_sensor_order() {
        let root = fake_root(["1\n", "0\n", "0\n", "1\n"]);
        let mut sensors = SysfsGpioSensors::open(root.path(), PINS).unwrap();
        let state = sensors.read_sensors().unwrap();
        assert_eq!(state, SensorState::new(true, false, false, true));
        assert_eq!(state.to_string(), "1001");
    }

    #[test]
    fn configures_lines_as_inputs() {
        let root = fake_root(["0\n"; SENSOR_COUNT]);
        SysfsGpioSensors::open(root.path(), PINS).unwrap();
        for pin in PINS {
            let dir = fs::read_to_string(root.path().join(format!("gpio{pin}/direction"))).unwrap();
            assert_eq!(dir, "in");
        }
    }

    #[test]
    fn rereads_after_value_change() {
        let root = fake_root(["0\n"; SENSOR_COUNT]);
        let mut sensors = SysfsGpioSensors::open(root.path(), PINS).unwrap();
        assert!(sensors.read_sensors().unwrap().is_lost());

        set_value(root.path(), 17, "1\n");
        set_value(root.path(), 22, "1\n");
        assert_eq!(sensors.read_sensors().unwrap().to_string(), "0110");
    }

    #[test]
    fn missing_line_fails_init() {
        // Export "succeeds" into a plain file but the line directory never appears.
        let dir = TempDir::new().unwrap();
        let err = SysfsGpioSensors::open(dir.path(), PINS).unwrap_err();
        assert!(matches!(err, HalError::InitFailed(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("export")).unwrap(),
            "27"
        );
    }

    #[test]
    fn garbage_value_is_read_error() {
        let root = fake_root(["0\n", "x\n", "0\n", "0\n"]);
        let mut sensors = SysfsGpioSensors::open(root.path(), PINS).unwrap();
        assert!(matches!(
            sensors.read_sensors(),
            Err(HalError::SensorRead(_))
        ));
    }
}
