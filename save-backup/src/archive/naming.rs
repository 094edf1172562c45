//! Archive file naming.
//!
//! Names look like `md_save_backup_(Mon_Jan_2_3_04PM_2006).zip`: minute
//! resolution, no spaces or colons.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

const NAME_PREFIX: &str = "md_save_backup_(";
const NAME_SUFFIX: &str = ").zip";

/// Weekday, month, unpadded day, 12-hour clock with AM/PM, year.
const TIMESTAMP_FORMAT: &str = "%a %b %-d %-I:%M%p %Y";

/// Human-readable timestamp with every space and colon replaced by `_`.
fn sanitized_timestamp<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format(TIMESTAMP_FORMAT)
        .to_string()
        .replace([' ', ':'], "_")
}

/// Archive file name for the instant `now`.
pub fn generate_archive_name<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}{}{}", NAME_PREFIX, sanitized_timestamp(now), NAME_SUFFIX)
}

/// First free archive path in `out_dir` for `now`.
///
/// Two cycles landing in the same minute would share a name, so later ones get
/// a counter inside the parentheses: `md_save_backup_(..._2).zip`.
pub fn unique_archive_path<Tz>(out_dir: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let candidate = out_dir.join(generate_archive_name(now));
    if !candidate.exists() {
        return candidate;
    }

    let timestamp = sanitized_timestamp(now);
    (2u32..)
        .map(|n| out_dir.join(format!("{NAME_PREFIX}{timestamp}_{n}{NAME_SUFFIX}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
