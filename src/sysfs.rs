//! Integer read/write on sysfs control nodes.

use std::{fs, path::Path};

use log::{error, trace};

use crate::error::{Error, Result};

/// Parses the integer at the start of `content`, ignoring leading whitespace
/// and anything after the digits.
fn parse_leading_int(content: &str) -> Option<i64> {
    let s = content.trim_start();
    let sign_len = usize::from(s.starts_with(['-', '+']));
    let digits_len = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    s[..sign_len + digits_len].parse().ok()
}

/// Reads the leading integer of a node. Failures are logged and returned.
pub fn read_int(path: &Path) -> Result<i64> {
    let content = fs::read_to_string(path).map_err(|source| {
        error!("Can't read {}: {source}", path.display());
        Error::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;

    parse_leading_int(&content).ok_or_else(|| {
        error!("No integer in {}", path.display());
        Error::Parse {
            path: path.to_path_buf(),
            content: content.trim().to_owned(),
        }
    })
}

/// Truncates the node and writes `value` in decimal. Failures are logged and returned.
pub fn write_int(path: &Path, value: u32) -> Result<()> {
    trace!("Writing {value} to {}", path.display());
    fs::write(path, value.to_string()).map_err(|source| {
        error!("Can't write {value} to {}: {source}", path.display());
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    })
}
