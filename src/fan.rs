use std::{
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
};

use log::{error, info, trace, warn};

use crate::{config::Config, error::Result, sysfs};

/// Below this share of the cap the fan stalls, so it is switched off instead.
const STALL_RATIO: f64 = 0.4;
const SPAN_RATIO: f64 = 1.0 - STALL_RATIO;

/// Reads the maximum duty cycle the fan accepts. Unreadable or non-positive
/// values yield 0, which keeps the fan off.
#[must_use]
pub fn get_pwm_cap(path: &Path) -> u32 {
    match sysfs::read_int(path) {
        Ok(cap) if cap > 0 => u32::try_from(cap).unwrap_or(u32::MAX),
        Ok(cap) => {
            error!("Invalid PWM cap {cap} in {}", path.display());
            0
        }
        Err(_) => 0,
    }
}

/// PWM capability shared by the control loop and the exit handler.
///
/// Only a positive read is kept. Until then every call reads the node again.
pub struct PwmCap {
    path: PathBuf,
    cached: OnceLock<u32>,
}

impl PwmCap {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            cached: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn get(&self) -> u32 {
        if let Some(cap) = self.cached.get() {
            return *cap;
        }

        let cap = get_pwm_cap(&self.path);
        if cap == 0 {
            warn!("PWM cap is 0, the fan will stay off: cooling is disabled");
            return cap;
        }
        info!("PWM cap: {cap}");
        *self.cached.get_or_init(|| cap)
    }
}

/// Maps a temperature to a duty cycle in `[0, pwm_cap]`.
///
/// The response runs linearly from 40% of the cap at `off_temp` to the full cap
/// at `max_temp`. Anything at or under the 40% stall floor is turned off.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn adjust_fan_speed(temp: f64, off_temp: i32, max_temp: i32, pwm_cap: u32) -> u32 {
    let (off, max) = (f64::from(off_temp), f64::from(max_temp));
    let ratio = if temp <= off {
        0.0
    } else if temp >= max {
        1.0
    } else {
        (temp - off) / (max - off)
    };

    let cap = f64::from(pwm_cap);
    let raw = cap * ratio.mul_add(SPAN_RATIO, STALL_RATIO);
    trace!("Temp {temp:.2}°C, ratio {ratio:.3}, raw duty {raw:.2}");

    if raw <= cap * STALL_RATIO {
        0
    } else if raw >= cap {
        pwm_cap
    } else {
        raw as u32
    }
}

pub struct Fan {
    pub target: PathBuf,
    pub pwm_cap: Arc<PwmCap>,
}

impl Fan {
    /// Binds the fan to the target node and loads the shared PWM capability.
    #[must_use]
    pub fn new(config: &Config, pwm_cap: Arc<PwmCap>) -> Self {
        info!("Fan device: {}", config.paths.target_pwm.display());
        let _ = pwm_cap.get();
        Self {
            target: config.paths.target_pwm.clone(),
            pwm_cap,
        }
    }

    #[must_use]
    pub fn choose_speed(&self, current_temp: f64, config: &Config) -> u32 {
        adjust_fan_speed(
            current_temp,
            config.threshold.off,
            config.threshold.max,
            self.pwm_cap.get(),
        )
    }

    pub fn set_fan_speed(&self, speed: u32) -> Result<()> {
        sysfs::write_int(&self.target, speed)
    }

    /// Duty currently in effect on the target node.
    pub fn read_fan_speed(&self) -> Result<i64> {
        sysfs::read_int(&self.target)
    }
}
