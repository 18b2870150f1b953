use chrono::{DateTime, FixedOffset, Offset, Utc};
use core::{fmt, str::FromStr};

/// Fallback zone used when no timezone is configured (UTC+08:00, which is
/// Asia/Kuala_Lumpur all year round).
pub const DEFAULT_ZONE: &str = "+08:00";

/// A fixed UTC offset in which lead identifiers and timestamps are rendered.
///
/// Accepts `UTC`, `Z`, or a signed `±HH:MM` / `±HHMM` offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zone(FixedOffset);

impl Zone {
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    /// Picks the configured zone, falling back to `fallback` when nothing is
    /// configured or the configured value is blank.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneParseError`] if whichever value is selected does not
    /// parse.
    pub fn resolve(configured: Option<&str>, fallback: &str) -> Result<Self, ZoneParseError> {
        match configured.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.parse(),
            None => fallback.parse(),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Converts a UTC instant into local time for this zone.
    pub fn localize(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.0)
    }
}

impl Default for Zone {
    fn default() -> Self {
        DEFAULT_ZONE.parse().unwrap_or_else(|_| Self::utc())
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized timezone {input:?}; expected `UTC` or an offset such as `+08:00`")]
pub struct ZoneParseError {
    input: String,
}

impl FromStr for Zone {
    type Err = ZoneParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let err = || ZoneParseError {
            input: input.to_string(),
        };

        if input.eq_ignore_ascii_case("utc") || input.eq_ignore_ascii_case("z") {
            return Ok(Self::utc());
        }

        // chrono stops reading after the offset; anything longer is trailing input.
        if !matches!(input.len(), 5 | 6) {
            return Err(err());
        }
        input.parse::<FixedOffset>().map(Self).map_err(|_| err())
    }
}
