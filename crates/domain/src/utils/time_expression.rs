//! French time expression resolver.
//!
//! Turns the time part of a caller's request into a concrete start instant in
//! the clinic timezone. Only a bounded set of phrasings is understood:
//!
//! 1. `demain [à] H[h][MM]`
//! 2. `aujourd'hui [à] H[h][MM]`
//! 3. `DD/MM/YYYY [à] H[h][MM]`
//!
//! Matchers are tried in that order and the first one whose pattern occurs in
//! the text decides the outcome, including when the captured fields do not
//! form a valid date. Anything else fails with [`ParseFailure::NoMatch`];
//! the resolver never falls back to "now" or to a guessed time.

use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::errors::RendezvousError;

static TOMORROW_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(après[-\s]?)?demain\s+(?:à\s+)?(\d{1,2})h?(\d{2})?\b")
        .expect("TOMORROW_REGEX should compile - this is a bug")
});

static TODAY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\baujourd['’]?\s?hui\s+(?:à\s+)?(\d{1,2})h?(\d{2})?\b")
        .expect("TODAY_REGEX should compile - this is a bug")
});

static EXPLICIT_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})/(\d{1,2})/(\d{4})\s+(?:à\s+)?(\d{1,2})h?(\d{2})?\b")
        .expect("EXPLICIT_DATE_REGEX should compile - this is a bug")
});

/// Outcome of resolving a time expression.
pub type ParseResult = std::result::Result<DateTime<Tz>, ParseFailure>;

/// Why a time expression could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no supported time expression found")]
    NoMatch,

    #[error("{pattern}: {reason}")]
    InvalidDateTime { pattern: &'static str, reason: String },

    #[error("{pattern}: unsupported phrasing '{phrase}'")]
    Unsupported { pattern: &'static str, phrase: String },

    #[error("{0} does not exist in the clinic timezone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("{0} is ambiguous in the clinic timezone")]
    AmbiguousLocalTime(NaiveDateTime),
}

impl From<ParseFailure> for RendezvousError {
    fn from(value: ParseFailure) -> Self {
        Self::Parse(value.to_string())
    }
}

/// One supported phrasing.
pub trait TimeExpressionMatcher: Send + Sync {
    /// Stable name used in failures and logs.
    fn name(&self) -> &'static str;

    /// `None` when the phrasing does not occur in `text`; otherwise the
    /// resolved instant or the reason the captured fields are unusable.
    fn resolve(&self, text: &str, reference_now: &DateTime<Tz>) -> Option<ParseResult>;
}

/// `demain [à] H[h][MM]`: the day after `reference_now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomorrowMatcher;

impl TimeExpressionMatcher for TomorrowMatcher {
    fn name(&self) -> &'static str {
        "tomorrow"
    }

    fn resolve(&self, text: &str, reference_now: &DateTime<Tz>) -> Option<ParseResult> {
        let caps = TOMORROW_REGEX.captures(text)?;

        if caps.get(1).is_some() {
            return Some(Err(ParseFailure::Unsupported {
                pattern: self.name(),
                phrase: caps[0].to_string(),
            }));
        }

        Some(self.at(&caps, reference_now))
    }
}

impl TomorrowMatcher {
    fn at(self, caps: &Captures<'_>, reference_now: &DateTime<Tz>) -> ParseResult {
        let time = clock_time(self.name(), caps, 2, 3)?;
        let date = reference_now.date_naive().checked_add_days(Days::new(1)).ok_or_else(|| {
            ParseFailure::InvalidDateTime {
                pattern: self.name(),
                reason: "reference date has no following day".into(),
            }
        })?;
        localize(reference_now.timezone(), date.and_time(time))
    }
}

/// `aujourd'hui [à] H[h][MM]`: the date of `reference_now`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TodayMatcher;

impl TimeExpressionMatcher for TodayMatcher {
    fn name(&self) -> &'static str {
        "today"
    }

    fn resolve(&self, text: &str, reference_now: &DateTime<Tz>) -> Option<ParseResult> {
        let caps = TODAY_REGEX.captures(text)?;

        Some(clock_time(self.name(), &caps, 1, 2).and_then(|time| {
            localize(reference_now.timezone(), reference_now.date_naive().and_time(time))
        }))
    }
}

/// `DD/MM/YYYY [à] H[h][MM]`: an explicit calendar date.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitDateMatcher;

impl TimeExpressionMatcher for ExplicitDateMatcher {
    fn name(&self) -> &'static str {
        "explicit_date"
    }

    fn resolve(&self, text: &str, reference_now: &DateTime<Tz>) -> Option<ParseResult> {
        let caps = EXPLICIT_DATE_REGEX.captures(text)?;

        Some(self.at(&caps, reference_now))
    }
}

impl ExplicitDateMatcher {
    fn at(self, caps: &Captures<'_>, reference_now: &DateTime<Tz>) -> ParseResult {
        let day = number(self.name(), &caps[1])?;
        let month = number(self.name(), &caps[2])?;
        let year = i32::try_from(number(self.name(), &caps[3])?).map_err(|_| {
            ParseFailure::InvalidDateTime {
                pattern: self.name(),
                reason: format!("year {} is out of range", &caps[3]),
            }
        })?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ParseFailure::InvalidDateTime {
                pattern: self.name(),
                reason: format!("{day:02}/{month:02}/{year} is not a calendar date"),
            }
        })?;
        let time = clock_time(self.name(), caps, 4, 5)?;
        localize(reference_now.timezone(), date.and_time(time))
    }
}

/// Ordered list of matchers; the first whose phrasing occurs wins.
pub struct TimeExpressionResolver {
    matchers: Vec<Box<dyn TimeExpressionMatcher>>,
}

impl TimeExpressionResolver {
    pub fn new(matchers: Vec<Box<dyn TimeExpressionMatcher>>) -> Self {
        Self { matchers }
    }

    /// The supported French phrasings, in priority order.
    pub fn french() -> Self {
        Self::new(vec![
            Box::new(TomorrowMatcher),
            Box::new(TodayMatcher),
            Box::new(ExplicitDateMatcher),
        ])
    }

    /// Resolve `text` against `reference_now`, whose timezone is used for
    /// the result.
    ///
    /// The first matcher whose phrasing occurs decides the outcome: if its
    /// fields are invalid (e.g. "demain à 25h") the resolution fails, even
    /// when a later matcher would have accepted the text.
    pub fn resolve(&self, text: &str, reference_now: &DateTime<Tz>) -> ParseResult {
        self.matchers
            .iter()
            .find_map(|matcher| matcher.resolve(text, reference_now))
            .unwrap_or(Err(ParseFailure::NoMatch))
    }

    pub fn matcher_names(&self) -> Vec<&'static str> {
        self.matchers.iter().map(|m| m.name()).collect()
    }
}

impl Default for TimeExpressionResolver {
    fn default() -> Self {
        Self::french()
    }
}

impl std::fmt::Debug for TimeExpressionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeExpressionResolver").field("matchers", &self.matcher_names()).finish()
    }
}

fn number(pattern: &'static str, digits: &str) -> Result<u32, ParseFailure> {
    digits.parse::<u32>().map_err(|e| ParseFailure::InvalidDateTime {
        pattern,
        reason: format!("'{digits}' is not a number: {e}"),
    })
}

fn clock_time(
    pattern: &'static str,
    caps: &Captures<'_>,
    hour_group: usize,
    minute_group: usize,
) -> Result<NaiveTime, ParseFailure> {
    let hour = number(pattern, &caps[hour_group])?;
    let minute = match caps.get(minute_group) {
        Some(m) => number(pattern, m.as_str())?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| ParseFailure::InvalidDateTime {
        pattern,
        reason: format!("{hour}h{minute:02} is not a valid time of day"),
    })
}

fn localize(timezone: Tz, local: NaiveDateTime) -> ParseResult {
    match timezone.from_local_datetime(&local) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(_, _) => Err(ParseFailure::AmbiguousLocalTime(local)),
        LocalResult::None => Err(ParseFailure::NonexistentLocalTime(local)),
    }
}
