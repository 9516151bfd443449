//! System-wide constants for the line tracer workspace.
//!
//! Single source of truth for wire opcodes, default paths and timing.
//! Imported by all crates.

/// Number of line sensors on the robot.
pub const SENSOR_COUNT: usize = 4;

/// Number of distinct raw sensor patterns (`2^SENSOR_COUNT`).
pub const PATTERN_COUNT: usize = 1 << SENSOR_COUNT;

/// Highest speed the single-byte wire field can carry.
pub const SPEED_MAX: u16 = u8::MAX as u16;

/// Opcode of the drive frame.
pub const OPCODE_DRIVE: u8 = 0x01;

/// Opcode of the stop frame.
pub const OPCODE_STOP: u8 = 0x02;

/// Length of a drive frame in bytes.
pub const DRIVE_FRAME_LEN: usize = 5;

/// Length of a stop frame in bytes.
pub const STOP_FRAME_LEN: usize = 2;

/// I2C address of the motor controller.
pub const DEFAULT_BUS_ADDRESS: u16 = 0x16;

/// I2C character device the motor controller hangs off.
pub const DEFAULT_BUS_DEVICE: &str = "/dev/i2c-1";

/// Sysfs GPIO root.
pub const DEFAULT_GPIO_ROOT: &str = "/sys/class/gpio";

/// BCM line numbers of sensors s1..s4 (wiringPi pins 2, 3, 0, 7).
pub const DEFAULT_SENSOR_PINS: [u32; SENSOR_COUNT] = [27, 22, 17, 4];

/// Frames retained by the simulation bus by default.
pub const DEFAULT_SIM_HISTORY: usize = 64;

/// Default control period in microseconds (10 ms).
pub const CYCLE_TIME_US: u64 = 10_000;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/tracer/tracer.toml";

/// Canonical service name (used in logs).
pub const SERVICE_NAME: &str = "tracer";
