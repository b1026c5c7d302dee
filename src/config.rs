use std::{env, path::PathBuf, str::FromStr};

use log::{info, warn};

use crate::{PWM_CAP, TARGET_PWM, THERMAL_ZONE_GLOB};

const FAN_OFF_TEMP: i32 = 30;
const FAN_MAX_TEMP: i32 = 60;
const UPDATE_INTERVAL: u64 = 2;
/// Zone 6 reads far above the others on the reference board.
const EXCLUDED_ZONES: &[usize] = &[6];

pub struct Config {
    pub threshold: Threshold,
    pub paths: Paths,
    pub excluded_zones: Box<[usize]>,
    pub sleep_time: u64,
    pub debug: bool,
}

/// Temperatures in °C bounding the proportional range.
pub struct Threshold {
    pub off: i32,
    pub max: i32,
}

pub struct Paths {
    pub thermal_zones: String,
    pub pwm_cap: PathBuf,
    pub target_pwm: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    fn get_env<T: FromStr>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
        fallback: T,
    ) -> T {
        lookup(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(fallback)
    }

    fn parse_excluded(value: Option<String>) -> Box<[usize]> {
        let Some(value) = value else {
            return EXCLUDED_ZONES.into();
        };

        let parsed: Result<Vec<usize>, _> = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<usize>)
            .collect();

        parsed.map_or_else(
            |err| {
                warn!("Invalid EXCLUDED_ZONES {value:?} ({err}), using {EXCLUDED_ZONES:?}");
                EXCLUDED_ZONES.into()
            },
            Vec::into_boxed_slice,
        )
    }

    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    #[must_use]
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            threshold: Threshold {
                off: Self::get_env(&lookup, "FAN_OFF_TEMP", FAN_OFF_TEMP),
                max: Self::get_env(&lookup, "FAN_MAX_TEMP", FAN_MAX_TEMP),
            },
            paths: Paths {
                thermal_zones: lookup("THERMAL_ZONE_GLOB")
                    .unwrap_or_else(|| THERMAL_ZONE_GLOB.to_owned()),
                pwm_cap: lookup("PWM_CAP_PATH").map_or_else(|| PWM_CAP.into(), PathBuf::from),
                target_pwm: lookup("TARGET_PWM_PATH")
                    .map_or_else(|| TARGET_PWM.into(), PathBuf::from),
            },
            excluded_zones: Self::parse_excluded(lookup("EXCLUDED_ZONES")),
            sleep_time: Self::get_env(&lookup, "UPDATE_INTERVAL", UPDATE_INTERVAL),
            debug: Self::get_env(&lookup, "DEBUG", false),
        }
    }

    pub fn check_config(&self) {
        info!(
            "Fan off at {}°C, full speed at {}°C, update every {}s",
            self.threshold.off, self.threshold.max, self.sleep_time
        );
        info!(
            "Thermal zones: {} (excluded: {:?})",
            self.paths.thermal_zones, self.excluded_zones
        );

        if self.threshold.off >= self.threshold.max {
            panic!(
                "off threshold can't be >= max threshold: {} >= {}",
                self.threshold.off, self.threshold.max
            );
        }
    }
}
