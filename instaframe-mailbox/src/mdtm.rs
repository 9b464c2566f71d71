//! Modification-time parsing
//!
//! Servers report modification times as `YYYYMMDDHHMMSS` in UTC, optionally
//! followed by fractional seconds (`.sss`).

use chrono::NaiveDateTime;

use crate::error::MailboxError;

const MDTM_FORMAT: &str = "%Y%m%d%H%M%S";

/// Parse an MDTM value into seconds since the epoch
pub fn parse_mdtm(value: &str) -> Result<f64, MailboxError> {
    let value = value.trim();
    let invalid = || MailboxError::Timestamp(value.to_string());

    let (whole, fraction) = match value.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (value, None),
    };

    if whole.len() != 14 {
        return Err(invalid());
    }
    let naive = NaiveDateTime::parse_from_str(whole, MDTM_FORMAT).map_err(|_| invalid())?;
    let mut seconds = naive.and_utc().timestamp() as f64;

    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let fraction: f64 = format!("0.{fraction}").parse().map_err(|_| invalid())?;
        seconds += fraction;
    }

    Ok(seconds)
}
