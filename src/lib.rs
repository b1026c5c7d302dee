pub mod checker;
pub mod config;
pub mod error;
pub mod fan;
pub mod shutdown;
pub mod sysfs;
pub mod temp;

pub const THERMAL_ZONE_GLOB: &str = "/sys/devices/virtual/thermal/thermal_zone*/temp";
pub const PWM_CAP: &str = "/sys/devices/pwm-fan/pwm_cap";
pub const TARGET_PWM: &str = "/sys/devices/pwm-fan/target_pwm";
