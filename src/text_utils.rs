use std::cmp::Ordering;
use std::ops::Index;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Lowercase, hyphen separated and ASCII only. Same input, same slug.
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// Date portion of an ISO-8601 string, i.e. everything before the first `T`.
pub fn date_part(created_at: &str) -> &str {
    match created_at.find('T') {
        Some(pos) => &created_at[..pos],
        None => created_at,
    }
}

/// Parses `2014-01-21`, `2014-01-21T10:00`, `2014-01-21T10:00:00.000Z`, `2014-01-21T10:00:00+02:00`...
/// Without an offset the time is taken as UTC.
pub fn parse_created_at(buf: &str) -> Result<DateTime<Utc>, String> {
    lazy_static! {
        static ref DATE_TIME_REGEX: Regex = Regex::new(
            r"^([0-9]{4})-([0-9]{1,2})-([0-9]{1,2})(?:[T ]([0-9]{1,2}):([0-9]{1,2})(?::([0-9]{1,2})(?:\.([0-9]+))?)?)?\s*(Z|[+-][0-9]{2}:?[0-9]{2})?$"
        ).unwrap();
    }

    let buf = buf.trim();
    let Some(caps) = DATE_TIME_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);
    let opt_u32 = |idx: usize| caps.get(idx).map_or(Ok(0), |m| to_u32(m.as_str()));

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = opt_u32(4)?;
    let mn: u32 = opt_u32(5)?;
    let s: u32 = opt_u32(6)?;
    let nanos: u32 = match caps.get(7) {
        Some(fraction) => {
            let digits: String = fraction.as_str().chars().chain(std::iter::repeat('0')).take(9).collect();
            to_u32(&digits)?
        }
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date in {}", buf))?;
    let time = NaiveTime::from_hms_nano_opt(h, mn, s, nanos)
        .ok_or_else(|| format!("Invalid time in {}", buf))?;
    let naive = NaiveDateTime::new(date, time);

    let offset = match caps.get(8) {
        Some(offset) => parse_offset(offset.as_str(), buf)?,
        None => return Ok(Utc.from_utc_datetime(&naive)),
    };

    match offset.from_local_datetime(&naive).single() {
        Some(date_time) => Ok(date_time.with_timezone(&Utc)),
        None => Err(format!("Ambiguous date time {}", buf)),
    }
}

fn parse_offset(offset: &str, date_str: &str) -> Result<FixedOffset, String> {
    if offset == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(|| format!("Invalid offset in {}", date_str));
    }

    let sign = if offset.starts_with('-') { -1 } else { 1 };
    let digits: String = offset[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = to_int(&digits[0..2], date_str)?;
    let minutes: i32 = to_int(&digits[2..4], date_str)?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| format!("Invalid offset in {}", date_str))
}

/// Locale-like ordering: accents folded and case ignored. On ties the unaccented form goes
/// first, then the lowercase one.
pub fn compare_tags(a: &str, b: &str) -> Ordering {
    let folded_a = unidecode::unidecode(a).to_lowercase();
    let folded_b = unidecode::unidecode(b).to_lowercase();
    folded_a.cmp(&folded_b)
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

pub fn sort_tags(mut tags: Vec<String>) -> Vec<String> {
    tags.sort_by(|a, b| compare_tags(a, b));
    tags
}

pub fn format_date_time(date_time: &DateTime<Utc>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}
