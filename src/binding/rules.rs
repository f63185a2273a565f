//! Named validation rules.
//!
//! A field declares its rules as a comma list such as `required,gt=0`.
//! Each entry names a [`Rule`] in the [`RuleSet`] and may carry one
//! parameter after `=`. New rules plug in through [`RuleSet::register`].

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

/// A decoded, typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(NaiveDate),
    Number(f64),
    Text(String),
}

/// A named predicate over a decoded field.
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    /// `value` is `None` when the field is absent or empty.
    fn check(&self, value: Option<&FieldValue>, param: Option<&str>) -> bool;
}

/// Field must be present and non-empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn check(&self, value: Option<&FieldValue>, _param: Option<&str>) -> bool {
        value.is_some()
    }
}

/// Numeric comparison against the rule parameter. Text compares its
/// character count; dates are left to temporal rules.
#[derive(Debug, Clone, Copy)]
pub struct Compare {
    name: &'static str,
    holds: fn(f64, f64) -> bool,
}

impl Compare {
    pub fn gt() -> Self {
        Self { name: "gt", holds: |v, p| v > p }
    }

    pub fn gte() -> Self {
        Self { name: "gte", holds: |v, p| v >= p }
    }

    pub fn lt() -> Self {
        Self { name: "lt", holds: |v, p| v < p }
    }
}

impl Rule for Compare {
    fn name(&self) -> &str {
        self.name
    }

    fn check(&self, value: Option<&FieldValue>, param: Option<&str>) -> bool {
        let Some(bound) = param.and_then(|p| p.trim().parse::<f64>().ok()) else {
            return false;
        };
        match value {
            None | Some(FieldValue::Date(_)) => true,
            Some(FieldValue::Number(n)) => (self.holds)(*n, bound),
            Some(FieldValue::Text(s)) => (self.holds)(s.chars().count() as f64, bound),
        }
    }
}

/// Date must fall strictly after the instant the rule runs.
///
/// A calendar date stands for midnight UTC at its start.
#[derive(Debug, Clone, Copy)]
pub struct FutureDate {
    clock: fn() -> DateTime<Utc>,
}

impl FutureDate {
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }
}

impl Default for FutureDate {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl Rule for FutureDate {
    fn name(&self) -> &str {
        "future"
    }

    fn check(&self, value: Option<&FieldValue>, _param: Option<&str>) -> bool {
        match value {
            Some(FieldValue::Date(date)) => date
                .and_hms_opt(0, 0, 0)
                .is_some_and(|start| start.and_utc() > (self.clock)()),
            _ => true,
        }
    }
}

/// Rule name → rule lookup used by the binder.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, Arc<dyn Rule>>,
}

impl RuleSet {
    /// Empty set; see [`RuleSet::standard`] for the built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// `required`, `gt`, `gte`, `lt` and `future`.
    pub fn standard() -> Self {
        let mut set = Self::new();
        set.register(Arc::new(Required));
        set.register(Arc::new(Compare::gt()));
        set.register(Arc::new(Compare::gte()));
        set.register(Arc::new(Compare::lt()));
        set.register(Arc::new(FutureDate::default()));
        set
    }

    /// Add or replace the rule under its name.
    pub fn register(&mut self, rule: Arc<dyn Rule>) -> &mut Self {
        self.rules.insert(rule.name().to_string(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("RuleSet").field("rules", &names).finish()
    }
}

/// One parsed entry of a rule list: `gt=0` → ("gt", Some("0")).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleExpr<'a> {
    pub name: &'a str,
    pub param: Option<&'a str>,
    pub raw: &'a str,
}

/// Split a declaration such as `required,gt=0`.
pub fn parse_rules(declaration: &str) -> impl Iterator<Item = RuleExpr<'_>> {
    declaration
        .split(',')
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| match raw.split_once('=') {
            Some((name, param)) => RuleExpr {
                name,
                param: Some(param),
                raw,
            },
            None => RuleExpr {
                name: raw,
                param: None,
                raw,
            },
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> FieldValue {
        FieldValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_future_is_strictly_after_now() {
        let rule = FutureDate::with_clock(fixed_now);
        assert!(rule.check(Some(&date(2024, 3, 11)), None));
        assert!(!rule.check(Some(&date(2024, 3, 10)), None));
        assert!(!rule.check(Some(&date(2024, 3, 9)), None));
        assert!(rule.check(None, None));
    }

    #[test]
    fn test_future_uses_real_clock_by_default() {
        let rule = FutureDate::default();
        let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
        let yesterday = (Utc::now() - Duration::days(1)).date_naive();
        assert!(rule.check(Some(&FieldValue::Date(tomorrow)), None));
        assert!(!rule.check(Some(&FieldValue::Date(yesterday)), None));
    }

    #[test]
    fn test_gt_compares_numbers_and_text_length() {
        let gt = Compare::gt();
        assert!(gt.check(Some(&FieldValue::Number(1.0)), Some("0")));
        assert!(!gt.check(Some(&FieldValue::Number(0.0)), Some("0")));
        assert!(!gt.check(Some(&FieldValue::Number(-5.0)), Some("0")));
        assert!(gt.check(Some(&FieldValue::Text("ab".into())), Some("1")));
        assert!(gt.check(None, Some("0")));
        assert!(!gt.check(Some(&FieldValue::Number(3.0)), Some("abc")));
    }

    #[test]
    fn test_required_only_checks_presence() {
        assert!(Required.check(Some(&FieldValue::Number(0.0)), None));
        assert!(!Required.check(None, None));
    }

    #[test]
    fn test_parses_rule_lists() {
        let parsed: Vec<_> = parse_rules("required, gt=0,,future").collect();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].name, "gt");
        assert_eq!(parsed[1].param, Some("0"));
        assert_eq!(parsed[1].raw, "gt=0");
        assert_eq!(parsed[2].param, None);
    }

    #[test]
    fn test_custom_rules_plug_in_by_name() {
        struct Weekday;
        impl Rule for Weekday {
            fn name(&self) -> &str {
                "weekday"
            }
            fn check(&self, value: Option<&FieldValue>, _param: Option<&str>) -> bool {
                use chrono::Datelike;
                match value {
                    Some(FieldValue::Date(d)) => d.weekday().number_from_monday() <= 5,
                    _ => true,
                }
            }
        }

        let mut set = RuleSet::standard();
        assert!(!set.contains("weekday"));
        set.register(Arc::new(Weekday));
        let rule = set.get("weekday").unwrap();
        // 2024-03-09 was a Saturday.
        assert!(!rule.check(Some(&date(2024, 3, 9)), None));
        assert!(rule.check(Some(&date(2024, 3, 11)), None));
    }
}
