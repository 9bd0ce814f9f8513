//! Serde helpers for form values.
//!
//! Dates travel as `YYYY-MM-DD` strings, the format date inputs produce.
//! Amounts may arrive as numbers or as the text the user typed.

use serde::Deserialize;
use serde::de::{self, Deserializer};
use time::Date;
use time::format_description::StaticFormatDescription;
use time::macros::format_description;

/// `YYYY-MM-DD`, zero-padded.
pub const ISO_DATE: StaticFormatDescription = format_description!("[year]-[month]-[day]");

// `#[serde(with = "iso_date")]` adapter for `time::Date`.
time::serde::format_description!(pub iso_date, Date, ISO_DATE);

#[must_use]
pub fn format_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, ISO_DATE)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

/// `deserialize_with` helper accepting `500`, `"500"` or `"1,250.00"`.
pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => n,
        RawAmount::Text(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid amount `{s}`")))?,
    };
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(de::Error::custom(format!("amount must be positive, got {value}")))
    }
}

/// `deserialize_with` helper for whole counts such as `termDays`, accepting
/// `30`, `30.0` or `"30"`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = match RawAmount::deserialize(deserializer)? {
        RawAmount::Number(n) => n,
        RawAmount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid number `{s}`")))?,
    };
    if value.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return Err(de::Error::custom(format!("expected a whole number, got {value}")));
    }
    Ok(value as u32)
}
