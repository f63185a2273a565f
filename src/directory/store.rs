//! Employee lookup and time-off mutation.

use std::sync::RwLock;

use chrono::NaiveDate;
use thiserror::Error;

use crate::directory::employee::{Employee, TimeOff, TimeoffStatus, TimeoffType};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("employee {0} not found")]
    NotFound(u32),

    #[error("employee directory unavailable: {0}")]
    Unavailable(String),
}

/// Source of employee records.
///
/// Implementations hand out owned snapshots; appending time off is the only
/// mutation.
pub trait EmployeeDirectory: Send + Sync {
    /// All employees, ordered by id.
    fn get_all(&self) -> Result<Vec<Employee>, LookupError>;

    fn get(&self, id: u32) -> Result<Employee, LookupError>;

    /// Append `entry` and return the updated record.
    fn append_time_off(&self, id: u32, entry: TimeOff) -> Result<Employee, LookupError>;
}

/// Process-local directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    employees: RwLock<Vec<Employee>>,
}

impl InMemoryDirectory {
    pub fn new(mut employees: Vec<Employee>) -> Self {
        employees.sort_by_key(|e| e.id);
        Self {
            employees: RwLock::new(employees),
        }
    }

    /// Directory preloaded with the demo staff.
    pub fn seeded() -> Self {
        Self::new(seed())
    }
}

fn poisoned<T>(_: T) -> LookupError {
    LookupError::Unavailable("directory lock poisoned".to_string())
}

impl EmployeeDirectory for InMemoryDirectory {
    fn get_all(&self) -> Result<Vec<Employee>, LookupError> {
        let employees = self.employees.read().map_err(poisoned)?;
        Ok(employees.clone())
    }

    fn get(&self, id: u32) -> Result<Employee, LookupError> {
        let employees = self.employees.read().map_err(poisoned)?;
        employees
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(LookupError::NotFound(id))
    }

    fn append_time_off(&self, id: u32, entry: TimeOff) -> Result<Employee, LookupError> {
        let mut employees = self.employees.write().map_err(poisoned)?;
        let employee = employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(LookupError::NotFound(id))?;
        employee.time_off.push(entry);
        tracing::debug!(employee_id = id, entries = employee.time_off.len(), "Time off appended");
        Ok(employee.clone())
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn seed() -> Vec<Employee> {
    let entry = |d: NaiveDate, amount: f64, kind, status| TimeOff {
        date: d,
        amount,
        kind,
        status,
    };

    vec![
        Employee {
            id: 962,
            first_name: "Lorne".into(),
            last_name: "Prosacco".into(),
            position: "Software Engineer".into(),
            start_date: date(2019, 3, 4),
            status: "Active".into(),
            total_pto: 30.0,
            time_off: vec![
                entry(date(2022, 6, 17), 8.0, TimeoffType::Holiday, TimeoffStatus::Taken),
                entry(date(2022, 12, 23), 8.0, TimeoffType::Pto, TimeoffStatus::Scheduled),
            ],
        },
        Employee {
            id: 1174,
            first_name: "Mireya".into(),
            last_name: "Lind".into(),
            position: "Product Manager".into(),
            start_date: date(2020, 9, 14),
            status: "Active".into(),
            total_pto: 24.0,
            time_off: vec![entry(
                date(2022, 11, 25),
                4.0,
                TimeoffType::Pto,
                TimeoffStatus::Requested,
            )],
        },
        Employee {
            id: 2301,
            first_name: "Dorian".into(),
            last_name: "Schmitt".into(),
            position: "Support Specialist".into(),
            start_date: date(2021, 1, 11),
            status: "On Leave".into(),
            total_pto: 16.0,
            time_off: Vec::new(),
        },
    ]
}
