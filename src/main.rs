use std::{env, io::Write, sync::Arc};

use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter, info, warn};
use pwm_fan_daemon::{checker::Checker, config::Config, fan::PwmCap, shutdown};

fn setup_logging(debug_mode: bool) {
    let level_filter = match env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .to_ascii_lowercase()
        .as_str()
    {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Debug,
    };

    let mut builder = Builder::new();

    if !debug_mode {
        builder.format(|f, r| {
            let color = match r.level() {
                Level::Warn => r.args().to_string().yellow(),
                Level::Error => r.args().to_string().red(),
                Level::Info => r.args().to_string().green(),
                Level::Debug => r.args().to_string().blue(),
                Level::Trace => r.args().to_string().cyan(),
            };
            writeln!(f, "{color}")
        });
    }

    builder.filter_level(level_filter).init();

    println!("Log level set to: {level_filter}");
    let msg = format!(
        "Starting PWM Fan Daemon v{}",
        env!("CARGO_PKG_VERSION")
    );

    if debug_mode {
        info!("{msg}");
    } else {
        println!("{msg}");
    }
}

fn main() {
    let config = Config::new();
    setup_logging(config.debug);
    config.check_config();

    // Loads the PWM cap before the exit handler can need it.
    let pwm_cap = Arc::new(PwmCap::new(config.paths.pwm_cap.clone()));
    let checker = Checker::new(config, Arc::clone(&pwm_cap));

    if let Err(err) = shutdown::install(&checker.config, pwm_cap) {
        warn!("{err}. The fan won't be set to full speed on exit");
    }

    checker.run();
}
