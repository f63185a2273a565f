//! Employee directory records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoffType {
    #[serde(rename = "PTO")]
    Pto,
    Holiday,
}

/// Lifecycle of a time-off entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoffStatus {
    Requested,
    Scheduled,
    Taken,
}

/// One time-off entry on an employee record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeOff {
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TimeoffType,
    pub status: TimeoffStatus,
}

impl TimeOff {
    /// A freshly submitted PTO request. Type and status are always assigned
    /// here, never taken from the caller.
    pub fn requested(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            kind: TimeoffType::Pto,
            status: TimeoffStatus::Requested,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub status: String,
    #[serde(rename = "totalPTO")]
    pub total_pto: f64,
    pub time_off: Vec<TimeOff>,
}
