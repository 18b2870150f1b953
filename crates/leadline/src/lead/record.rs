use crate::lead::{LeadId, LeadSubmission};
use chrono::{DateTime, TimeZone};
use core::fmt;

/// Column headers written to an empty lead sheet, in row order.
pub const HEADER: [&str; 6] = ["Timestamp", "LeadID", "Name", "WhatsApp", "Unit", "Strategy"];

/// One row of the lead sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeadRecord {
    pub timestamp: String,
    pub lead_id: LeadId,
    pub name: String,
    pub phone: String,
    pub unit: String,
    pub strategy: String,
}

impl LeadRecord {
    /// Builds the record for `submission`, stamping it with `at` at second
    /// precision (`yyyy-MM-dd HH:mm:ss`).
    pub fn new<Tz>(at: &DateTime<Tz>, lead_id: LeadId, submission: LeadSubmission) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let LeadSubmission {
            name,
            phone,
            unit,
            strategy,
        } = submission;
        Self {
            timestamp: at.format("%Y-%m-%d %H:%M:%S").to_string(),
            lead_id,
            name,
            phone,
            unit,
            strategy,
        }
    }

    /// Cells in [`HEADER`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.lead_id.to_string(),
            self.name.clone(),
            self.phone.clone(),
            self.unit.clone(),
            self.strategy.clone(),
        ]
    }
}

pub(crate) fn header_row() -> Vec<String> {
    HEADER.iter().map(|cell| (*cell).to_string()).collect()
}
