use std::{sync::Arc, thread, time::Duration};

use log::{debug, error, info, warn};

use crate::{
    config::Config,
    fan::{Fan, PwmCap},
    temp::Sampler,
};

pub struct Checker {
    pub config: Config,
    sampler: Sampler,
    fan: Fan,
}

impl Checker {
    #[must_use]
    pub fn new(config: Config, pwm_cap: Arc<PwmCap>) -> Self {
        let sampler = Sampler::new(&config);
        let fan = Fan::new(&config, pwm_cap);

        Self {
            config,
            sampler,
            fan,
        }
    }

    /// Runs one sample, compute, actuate cycle. Returns the duty written, or
    /// `None` when the cycle was skipped or the write failed.
    pub fn adjust_speed(&self) -> Option<u32> {
        let current_temp = match self.sampler.read_average_temp() {
            Ok(temp) => temp,
            Err(err) => {
                error!("Can't read temperature, skipping this cycle: {err}");
                return None;
            }
        };

        let desired_speed = self.fan.choose_speed(current_temp, &self.config);
        debug!("Desired speed {desired_speed}");

        let written = self.fan.set_fan_speed(desired_speed).is_ok();

        match self.fan.read_fan_speed() {
            Ok(speed) => {
                if speed != i64::from(desired_speed) {
                    warn!("Fan speed is {speed}, expected {desired_speed}");
                }
                info!("Temp: {current_temp:.2}°C, fan PWM: {speed}");
            }
            Err(err) => error!("Temp: {current_temp:.2}°C, can't read fan PWM back: {err}"),
        }

        written.then_some(desired_speed)
    }

    pub fn run(&self) -> ! {
        let interval = Duration::from_secs(self.config.sleep_time);
        loop {
            self.adjust_speed();
            debug!("Sleeping for {} seconds", self.config.sleep_time);
            thread::sleep(interval);
        }
    }
}
