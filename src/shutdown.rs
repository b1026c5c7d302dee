//! Leaves the fan at full speed when the daemon is interrupted or terminated.

use std::{path::Path, process, sync::Arc};

use log::{error, info};

use crate::{config::Config, error::Result, fan::PwmCap, sysfs};

/// Writes the PWM cap to `target`, reading the cap first if nothing cached it yet.
pub fn force_max(target: &Path, pwm_cap: &PwmCap) -> Result<u32> {
    let cap = pwm_cap.get();
    sysfs::write_int(target, cap)?;
    Ok(cap)
}

/// Registers the exit handler for SIGINT, SIGTERM and SIGHUP. The handler
/// forces the fan to its maximum and exits with status 1.
pub fn install(config: &Config, pwm_cap: Arc<PwmCap>) -> Result<()> {
    let target = config.paths.target_pwm.clone();

    ctrlc::set_handler(move || {
        info!("Got a termination signal, setting the fan to full speed");
        match force_max(&target, &pwm_cap) {
            Ok(cap) => info!("Fan PWM set to {cap} on exit"),
            Err(err) => error!("Can't leave the fan at full speed: {err}"),
        }
        process::exit(1);
    })?;

    info!("Exit handler installed");
    Ok(())
}
