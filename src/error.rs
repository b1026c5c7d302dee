use std::{io, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Can't read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("No integer in {path}: {content:?}")]
    Parse { path: PathBuf, content: String },

    #[error("Can't write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Invalid thermal zone pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("No thermal zone found")]
    NoThermalZones,

    #[error("No usable reading among {0} thermal zones")]
    NoValidReadings(usize),

    #[error("Can't install the signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
