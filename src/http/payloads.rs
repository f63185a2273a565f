//! Request payloads bound from bodies.

use chrono::NaiveDate;
use serde::Serialize;

use crate::binding::{Bind, BoundFields, FieldSpec, ValidationError};
use crate::directory::TimeOff;

/// A time-off request as submitted through the form and JSON endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeoffRequest {
    pub date: NaiveDate,
    pub amount: f64,
}

impl Bind for TimeoffRequest {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::date("date", "required,future"),
        FieldSpec::number("amount", "required,gt=0"),
    ];

    fn assemble(fields: &BoundFields) -> Result<Self, ValidationError> {
        Ok(Self {
            date: fields.date("date")?,
            amount: fields.number("amount")?,
        })
    }
}

/// Directory entries only take a date and an amount from the caller; type
/// and status are server-assigned.
impl Bind for TimeOff {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::date("date", "required"),
        FieldSpec::number("amount", "required,gt=0"),
    ];

    fn assemble(fields: &BoundFields) -> Result<Self, ValidationError> {
        Ok(TimeOff::requested(fields.date("date")?, fields.number("amount")?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Binder, ContentKind};
    use crate::directory::{TimeoffStatus, TimeoffType};
    use chrono::{Duration, Utc};

    fn days_from_today(days: i64) -> String {
        (Utc::now() + Duration::days(days))
            .date_naive()
            .format("%Y-%m-%d")
            .to_string()
    }

    #[test]
    fn test_yesterday_fails_future() {
        let body = format!("date={}&amount=1", days_from_today(-1));
        let errors = Binder::default()
            .bind::<TimeoffRequest>(body.as_bytes(), ContentKind::Form)
            .unwrap_err();
        assert!(errors.has("date", "future"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_tomorrow_echoes_payload() {
        let tomorrow = days_from_today(2);
        let body = format!(r#"{{"date":"{}","amount":1.0}}"#, tomorrow);
        let request: TimeoffRequest = Binder::default()
            .bind(body.as_bytes(), ContentKind::Json)
            .unwrap();

        let echoed = serde_json::to_value(&request).unwrap();
        assert_eq!(echoed, serde_json::json!({ "date": tomorrow, "amount": 1.0 }));
    }

    #[test]
    fn test_amount_rules() {
        let date = days_from_today(3);
        for amount in ["0", "-5"] {
            let body = format!("date={}&amount={}", date, amount);
            let errors = Binder::default()
                .bind::<TimeoffRequest>(body.as_bytes(), ContentKind::Form)
                .unwrap_err();
            assert!(errors.has("amount", "gt"), "amount {}", amount);
        }

        let body = format!("date={}", date);
        let errors = Binder::default()
            .bind::<TimeoffRequest>(body.as_bytes(), ContentKind::Form)
            .unwrap_err();
        assert!(errors.has("amount", "required"));
    }

    #[test]
    fn test_both_fields_reported() {
        let body = format!("date={}&amount=0", days_from_today(-2));
        let errors = Binder::default()
            .bind::<TimeoffRequest>(body.as_bytes(), ContentKind::Form)
            .unwrap_err();
        assert!(errors.has("date", "future"));
        assert!(errors.has("amount", "gt"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_time_off_ignores_caller_type_and_status() {
        let entry: TimeOff = Binder::default()
            .bind(
                b"date=2031-01-02&amount=4&type=Holiday&status=Taken",
                ContentKind::Form,
            )
            .unwrap();
        assert_eq!(entry.kind, TimeoffType::Pto);
        assert_eq!(entry.status, TimeoffStatus::Requested);
    }
}
