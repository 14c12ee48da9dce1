use std::borrow::Cow;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jiff::tz::TimeZone;
use lazy_static::lazy_static;
use zoneinfo_compiled::parse;

use crate::error::{Error, Result};

/// A time zone: the rule for turning an instant into a wall-clock date.
///
/// `Zone` is a cheap handle; clones share the same rules. Zones compare by identity of
/// their rules: UTC equals UTC, fixed zones compare by offset and zones loaded from the
/// tz database compare by name.
#[derive(Clone)]
pub struct Zone(Arc<ZoneKind>);

enum ZoneKind {
    Utc,
    Fixed { name: String, offset: i32 },
    Rules { name: String, rules: ZoneRules },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalTimeType {
    pub(crate) offset: i32,
    pub(crate) abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ZoneTransition {
    /// Unix second at which `local_time_type` comes into force.
    pub(crate) start: i64,
    pub(crate) local_time_type: LocalTimeType,
}

struct ZoneRules {
    /// Type in force before the first transition.
    initial: LocalTimeType,
    /// Sorted by `start`.
    transitions: Vec<ZoneTransition>,
    /// POSIX TZ rule for instants after the last transition.
    extension: Option<TimeZone>,
}

impl ZoneRules {
    fn lookup(&self, unix_seconds: i64) -> Cow<'_, LocalTimeType> {
        let index = self
            .transitions
            .partition_point(|t| t.start <= unix_seconds);
        if index == self.transitions.len() {
            if let Some(local_time_type) = self
                .extension
                .as_ref()
                .and_then(|rule| evaluate_rule(rule, unix_seconds))
            {
                return Cow::Owned(local_time_type);
            }
        }
        Cow::Borrowed(match index {
            0 => &self.initial,
            _ => &self.transitions[index - 1].local_time_type,
        })
    }
}

fn evaluate_rule(rule: &TimeZone, unix_seconds: i64) -> Option<LocalTimeType> {
    let timestamp = jiff::Timestamp::from_second(unix_seconds).ok()?;
    let info = rule.to_offset_info(timestamp);
    Some(LocalTimeType {
        offset: info.offset().seconds(),
        abbreviation: info.abbreviation().to_string(),
    })
}

fn tzdir() -> PathBuf {
    // TZDIR overrides the location of the tz database, as it does for the C library.
    env::var("TZDIR")
        .unwrap_or_else(|_| "/usr/share/zoneinfo".to_string())
        .into()
}

lazy_static! {
    static ref UTC: Zone = Zone(Arc::new(ZoneKind::Utc));
    static ref LOCAL: Zone = resolve_local();
}

fn resolve_local() -> Zone {
    let result = match env::var("TZ") {
        Err(_) => load_file(Path::new("/etc/localtime"), "Local"),
        Ok(tz) if tz.is_empty() => {
            debug!("TZ is empty, local zone is UTC");
            return Zone::utc();
        }
        Ok(tz) => {
            let tz = tz.strip_prefix(':').unwrap_or(&tz);
            if tz.starts_with('/') {
                load_file(Path::new(tz), "Local")
            } else {
                checked_zone_path(tz).and_then(|path| load_file(&path, "Local"))
            }
        }
    };
    match result {
        Ok(zone) => {
            debug!("resolved local zone");
            zone
        }
        Err(err) => {
            warn!("falling back to UTC for the local zone: {}", err);
            Zone::utc()
        }
    }
}

fn checked_zone_path(name: &str) -> Result<PathBuf> {
    let relative = Path::new(name);
    let escapes = relative.is_absolute()
        || relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if escapes {
        return Err(Error::UnknownZone {
            name: name.to_string(),
            reason: "not a tz database name".to_string(),
        });
    }
    Ok(tzdir().join(relative))
}

fn load_file(path: &Path, name: &str) -> Result<Zone> {
    trace!("loading zone {} from {}", name, path.display());
    let data = std::fs::read(path).map_err(|e| Error::UnknownZone {
        name: name.to_string(),
        reason: format!("{}: {}", path.display(), e),
    })?;
    Zone::from_tzif(name, data)
}

/// The POSIX TZ string that ends a version 2 or later TZif file, if it has a usable one.
fn tzif_footer(data: &[u8]) -> Option<TimeZone> {
    if data.get(4).map_or(true, |&version| version < b'2') {
        return None;
    }
    let body = data.strip_suffix(b"\n")?;
    let start = body.iter().rposition(|&b| b == b'\n')? + 1;
    let footer = std::str::from_utf8(&body[start..]).ok()?;
    if footer.is_empty() {
        return None;
    }
    match TimeZone::posix(footer) {
        Ok(rule) => Some(rule),
        Err(err) => {
            warn!("ignoring TZ rule {:?}: {}", footer, err);
            None
        }
    }
}

impl Zone {
    pub fn utc() -> Zone {
        UTC.clone()
    }

    /// The host's local zone, resolved from `TZ` (or `/etc/localtime`) on first use.
    pub fn local() -> Zone {
        LOCAL.clone()
    }

    /// A zone that is always `offset` seconds east of UTC.
    pub fn fixed(name: &str, offset: i32) -> Zone {
        Zone(Arc::new(ZoneKind::Fixed {
            name: name.to_string(),
            offset,
        }))
    }

    /// Loads a zone from the tz database, e.g. `"Europe/Stockholm"`.
    ///
    /// `""` and `"UTC"` give UTC without touching the filesystem and `"Local"` gives
    /// [`Zone::local`].
    pub fn load(name: &str) -> Result<Zone> {
        match name {
            "" | "UTC" => Ok(Zone::utc()),
            "Local" => Ok(Zone::local()),
            _ => load_file(&checked_zone_path(name)?, name),
        }
    }

    /// Builds a zone from the contents of a TZif file.
    ///
    /// The 32-bit transition table covers instants up to 2038. Later instants follow the
    /// POSIX TZ rule at the end of the file, or the last transition when there is none.
    pub(crate) fn from_tzif(name: &str, data: Vec<u8>) -> Result<Zone> {
        let extension = tzif_footer(&data);
        let tz = parse(data).map_err(|e| Error::UnknownZone {
            name: name.to_string(),
            reason: format!("malformed zoneinfo file: {}", e),
        })?;
        let spans = &tz.time_zone.fixed_timespans;
        let initial = LocalTimeType {
            offset: spans.first.offset as i32,
            abbreviation: spans.first.name.to_string(),
        };
        let transitions = spans
            .rest
            .iter()
            .map(|(start, span)| ZoneTransition {
                start: *start,
                local_time_type: LocalTimeType {
                    offset: span.offset as i32,
                    abbreviation: span.name.to_string(),
                },
            })
            .collect();
        Ok(Zone::from_rules(name, initial, transitions, extension))
    }

    pub(crate) fn from_rules(
        name: &str,
        initial: LocalTimeType,
        mut transitions: Vec<ZoneTransition>,
        extension: Option<TimeZone>,
    ) -> Zone {
        transitions.sort_by_key(|t| t.start);
        Zone(Arc::new(ZoneKind::Rules {
            name: name.to_string(),
            rules: ZoneRules {
                initial,
                transitions,
                extension,
            },
        }))
    }

    pub fn name(&self) -> &str {
        match &*self.0 {
            ZoneKind::Utc => "UTC",
            ZoneKind::Fixed { name, .. } => name,
            ZoneKind::Rules { name, .. } => name,
        }
    }

    pub fn is_utc(&self) -> bool {
        matches!(*self.0, ZoneKind::Utc)
    }

    /// Seconds east of UTC in force at the given instant.
    pub fn offset_at(&self, unix_seconds: i64) -> i32 {
        match &*self.0 {
            ZoneKind::Utc => 0,
            ZoneKind::Fixed { offset, .. } => *offset,
            ZoneKind::Rules { rules, .. } => rules.lookup(unix_seconds).offset,
        }
    }

    /// Abbreviation in force at the given instant, such as `CEST`. Unnamed fixed zones
    /// render their offset instead.
    pub fn abbreviation_at(&self, unix_seconds: i64) -> String {
        match &*self.0 {
            ZoneKind::Utc => "UTC".to_string(),
            ZoneKind::Fixed { name, offset } if name.is_empty() => format_offset(*offset),
            ZoneKind::Fixed { name, .. } => name.clone(),
            ZoneKind::Rules { rules, .. } => rules.lookup(unix_seconds).into_owned().abbreviation,
        }
    }

    /// Resolves a wall-clock second in this zone to a unix second.
    ///
    /// A wall-clock time skipped by a forward transition is shifted forward by the length of
    /// the gap, so midnight of a day always resolves to an instant on that day. A repeated
    /// wall-clock time resolves to one of its two instants.
    pub fn local_to_unix(&self, local_seconds: i64) -> i64 {
        let guess = self.offset_at(local_seconds);
        let first = local_seconds.saturating_sub(guess as i64);
        let actual = self.offset_at(first);
        if actual == guess {
            return first;
        }
        let second = local_seconds.saturating_sub(actual as i64);
        if self.offset_at(second) == actual {
            second
        } else {
            // Neither candidate is consistent: the time falls in a gap.
            first.max(second)
        }
    }
}

/// `+hhmm`, with seconds appended when the offset has any.
pub(crate) fn format_offset(offset: i32) -> String {
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.unsigned_abs();
    let (hours, minutes, seconds) = (offset / 3600, offset / 60 % 60, offset % 60);
    if seconds == 0 {
        format!("{}{:02}{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}{:02}{:02}", sign, hours, minutes, seconds)
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        match (&*self.0, &*other.0) {
            (ZoneKind::Utc, ZoneKind::Utc) => true,
            (ZoneKind::Fixed { offset: a, .. }, ZoneKind::Fixed { offset: b, .. }) => a == b,
            (ZoneKind::Rules { name: a, .. }, ZoneKind::Rules { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Zone {}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ZoneKind::Utc => write!(f, "Zone(UTC)"),
            ZoneKind::Fixed { name, offset } => {
                write!(f, "Zone({:?}, {})", name, format_offset(*offset))
            }
            ZoneKind::Rules { name, .. } => write!(f, "Zone({:?})", name),
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ZoneKind::Fixed { name, offset } if name.is_empty() => {
                f.write_str(&format_offset(*offset))
            }
            _ => f.write_str(self.name()),
        }
    }
}
