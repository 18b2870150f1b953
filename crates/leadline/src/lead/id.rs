use chrono::{DateTime, TimeZone};
use core::fmt;

/// Marker between the date part and the sequence part of a lead identifier.
pub const SEQUENCE_MARKER: &str = "ZX";

/// A human-readable lead reference of the form `yyMMdd-HHmm-ZX<seq>`.
///
/// The date part is the submission time in the configured zone; the sequence
/// part is the allocated counter value, zero-padded to two digits. Values of
/// 100 and above simply widen (`ZX105`).
///
/// Uniqueness comes entirely from the sequence: two identifiers minted in the
/// same minute differ only in their suffix.
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use leadline::LeadId;
///
/// let zone = FixedOffset::east_opt(8 * 3600).unwrap();
/// let at = zone.with_ymd_and_hms(2025, 3, 14, 9, 5, 0).unwrap();
///
/// assert_eq!(LeadId::new(&at, 7).to_string(), "250314-0905-ZX07");
/// assert_eq!(LeadId::new(&at, 105).to_string(), "250314-0905-ZX105");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LeadId {
    date_part: String,
    sequence: u64,
}

impl LeadId {
    pub fn new<Tz>(at: &DateTime<Tz>, sequence: u64) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Self {
            date_part: at.format("%y%m%d-%H%M").to_string(),
            sequence,
        }
    }

    /// The `yyMMdd-HHmm` portion.
    pub fn date_part(&self) -> &str {
        &self.date_part
    }

    /// The sequence number embedded in the identifier.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{SEQUENCE_MARKER}{:02}",
            self.date_part, self.sequence
        )
    }
}
