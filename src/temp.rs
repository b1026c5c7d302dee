use std::path::PathBuf;

use log::{debug, error, trace};

use crate::{
    config::Config,
    error::{Error, Result},
    sysfs,
};

/// One thermal zone value, in millidegrees Celsius.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorReading {
    pub path: PathBuf,
    pub millidegrees: i64,
}

pub struct Sampler {
    pub pattern: String,
    /// Zero-based positions, in discovery order, of zones left out of the average.
    pub excluded: Box<[usize]>,
}

impl Sampler {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            pattern: config.paths.thermal_zones.clone(),
            excluded: config.excluded_zones.clone(),
        }
    }

    /// Lists every node matching the pattern, re-enumerated on each call.
    pub fn discover_zones(&self) -> Result<Vec<PathBuf>> {
        let zones: Vec<PathBuf> = glob::glob(&self.pattern)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    error!("Can't access {}: {}", err.path().display(), err.error());
                    None
                }
            })
            .collect();
        trace!("Discovered {} thermal zones", zones.len());
        Ok(zones)
    }

    /// Reads every included zone. Unreadable zones are skipped.
    pub fn read_zones(&self) -> Result<Vec<SensorReading>> {
        let zones = self.discover_zones()?;
        if zones.is_empty() {
            return Err(Error::NoThermalZones);
        }
        let count = zones.len();

        let readings: Vec<SensorReading> = zones
            .into_iter()
            .enumerate()
            .filter(|(index, path)| {
                let excluded = self.excluded.contains(index);
                if excluded {
                    trace!("Zone {index} excluded: {}", path.display());
                }
                !excluded
            })
            .filter_map(|(_, path)| {
                sysfs::read_int(&path)
                    .ok()
                    .map(|millidegrees| SensorReading { path, millidegrees })
            })
            .collect();

        if readings.is_empty() {
            return Err(Error::NoValidReadings(count));
        }
        Ok(readings)
    }

    /// Average of the included zones, in degrees Celsius.
    pub fn read_average_temp(&self) -> Result<f64> {
        let readings = self.read_zones()?;
        let count = readings.len();
        let temp = average(&readings).ok_or(Error::NoValidReadings(count))?;
        debug!("Average of {count} zones: {temp:.2}°C");
        Ok(temp)
    }
}

/// Mean of `readings` in degrees, divided by the number of readings actually summed.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average(readings: &[SensorReading]) -> Option<f64> {
    if readings.is_empty() {
        return None;
    }
    let sum: i64 = readings.iter().map(|r| r.millidegrees).sum();
    Some(sum as f64 / readings.len() as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use std::{fs, os::unix::fs::PermissionsExt, path::Path};

    use tempfile::TempDir;

    use super::*;

    fn create_zones(values: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (i, value) in values.iter().enumerate() {
            let zone = dir.path().join(format!("thermal_zone{i}"));
            fs::create_dir(&zone).unwrap();
            fs::write(zone.join("temp"), value).unwrap();
        }
        dir
    }

    fn sampler(dir: &Path, excluded: &[usize]) -> Sampler {
        Sampler {
            pattern: format!("{}/thermal_zone*/temp", dir.display()),
            excluded: excluded.into(),
        }
    }

    fn reading(millidegrees: i64) -> SensorReading {
        SensorReading {
            path: PathBuf::from("temp"),
            millidegrees,
        }
    }

    #[test]
    fn test_discover_zones() {
        let dir = create_zones(&["40000", "42000", "44000"]);
        fs::create_dir(dir.path().join("cooling_device0")).unwrap();

        let zones = sampler(dir.path(), &[]).discover_zones().unwrap();

        assert_eq!(zones.len(), 3);
        assert!(zones[0].ends_with("thermal_zone0/temp"));
        assert!(zones[2].ends_with("thermal_zone2/temp"));
    }

    #[test]
    fn test_discover_zones_sees_new_zones() {
        let dir = create_zones(&["40000"]);
        let sampler = sampler(dir.path(), &[]);
        assert_eq!(sampler.discover_zones().unwrap().len(), 1);

        let zone = dir.path().join("thermal_zone1");
        fs::create_dir(&zone).unwrap();
        fs::write(zone.join("temp"), "41000").unwrap();

        assert_eq!(sampler.discover_zones().unwrap().len(), 2);
    }

    #[test]
    fn test_unreadable_zone_dir_is_skipped() {
        // Root reads through directory permissions.
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        for (board, value) in [("board0", "40000"), ("board1", "60000")] {
            let zone = dir.path().join(board).join("thermal_zone0");
            fs::create_dir_all(&zone).unwrap();
            fs::write(zone.join("temp"), value).unwrap();
        }
        let locked = dir.path().join("board1");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let sampler = Sampler {
            pattern: format!("{}/board*/thermal_zone*/temp", dir.path().display()),
            excluded: Box::new([]),
        };
        let zones = sampler.discover_zones();
        let temp = sampler.read_average_temp();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(zones.unwrap().len(), 1);
        assert!((temp.unwrap() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_pattern() {
        let sampler = Sampler {
            pattern: "/sys/[".to_owned(),
            excluded: Box::new([]),
        };

        assert!(matches!(sampler.discover_zones(), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_average_excludes_hot_zone() {
        let dir = create_zones(&[
            "40000", "40000", "40000", "40000", "40000", "40000", "99000", "40000",
        ]);

        let temp = sampler(dir.path(), &[6]).read_average_temp().unwrap();

        assert!((temp - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_divides_by_included_count() {
        let dir = create_zones(&["30000", "50000"]);

        let temp = sampler(dir.path(), &[6]).read_average_temp().unwrap();

        assert!((temp - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_without_exclusion() {
        let dir = create_zones(&["30000", "60000", "45000"]);

        let temp = sampler(dir.path(), &[]).read_average_temp().unwrap();

        assert!((temp - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unreadable_zone_is_skipped() {
        let dir = create_zones(&["30000", "invalid", "50000"]);

        let readings = sampler(dir.path(), &[]).read_zones().unwrap();

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].millidegrees, 30000);
        assert_eq!(readings[1].millidegrees, 50000);
    }

    #[test]
    fn test_no_zones() {
        let dir = tempfile::tempdir().unwrap();

        let result = sampler(dir.path(), &[6]).read_average_temp();

        assert!(matches!(result, Err(Error::NoThermalZones)));
    }

    #[test]
    fn test_all_zones_excluded_or_broken() {
        let dir = create_zones(&["invalid", "40000"]);

        let result = sampler(dir.path(), &[1]).read_average_temp();

        assert!(matches!(result, Err(Error::NoValidReadings(2))));
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[reading(45000)]), Some(45.0));
        assert_eq!(average(&[reading(45000), reading(55000)]), Some(50.0));
    }
}
