//! Form-style input checking: each mutating operation runs an ordered list
//! of named rules against its input struct and collects every violation.
//!
//! Length/shape rules skip empty values: `required` owns the empty case, so
//! a blank field reports one violation, not three.

use chrono::NaiveDate;

use crate::error::{ApiError, FieldViolation};

#[derive(Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, rule: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field,
            rule,
            message: message.into(),
        });
    }

    pub fn required(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "required", format!("{field} is required"));
        }
    }

    pub fn length(&mut self, field: &'static str, value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len == 0 {
            return;
        }
        if len < min || len > max {
            self.push(
                field,
                "length",
                format!("{field} must be between {min} and {max} characters"),
            );
        }
    }

    pub fn max_length(&mut self, field: &'static str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(
                field,
                "length",
                format!("{field} must be at most {max} characters"),
            );
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) {
        if value.is_empty() {
            return;
        }
        let ok = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !value.contains(char::is_whitespace)
            }
            None => false,
        };
        if !ok {
            self.push(field, "email", format!("{field} must be a valid email address"));
        }
    }

    pub fn range(&mut self, field: &'static str, value: i64, min: i64, max: i64) {
        if value < min || value > max {
            self.push(
                field,
                "range",
                format!("{field} must be between {min} and {max}"),
            );
        }
    }

    pub fn min_value(&mut self, field: &'static str, value: Option<i64>, min: i64) {
        if let Some(v) = value {
            if v < min {
                self.push(field, "range", format!("{field} must be at least {min}"));
            }
        }
    }

    pub fn equals(&mut self, field: &'static str, a: &str, b: &str, message: &str) {
        if a != b {
            self.push(field, "equals", message);
        }
    }

    pub fn not_in_past(&mut self, field: &'static str, value: NaiveDate, today: NaiveDate) {
        if value < today {
            self.push(field, "date", "Event date cannot be in the past.");
        }
    }

    /// Escape hatch for rules that need outside context, e.g. store-backed
    /// uniqueness probes.
    pub fn check(&mut self, field: &'static str, rule: &'static str, ok: bool, message: &str) {
        if !ok {
            self.push(field, rule, message);
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violations(v: Validator) -> Vec<FieldViolation> {
        match v.finish() {
            Err(ApiError::Validation(violations)) => violations,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn clean_input_passes() {
        let mut v = Validator::new();
        v.required("username", "alice");
        v.length("username", "alice", 3, 50);
        v.email("email", "alice@example.com");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn violations_keep_declaration_order() {
        let mut v = Validator::new();
        v.required("username", "");
        v.email("email", "not-an-email");
        v.range("star_rating", 9, 1, 5);
        let vs = violations(v);
        assert_eq!(vs.len(), 3);
        assert_eq!(vs[0].field, "username");
        assert_eq!(vs[1].field, "email");
        assert_eq!(vs[2].field, "star_rating");
    }

    #[test]
    fn empty_value_reports_required_only() {
        let mut v = Validator::new();
        v.required("title", "   ");
        v.length("title", "", 3, 200);
        v.email("email", "");
        let vs = violations(v);
        assert_eq!(vs.len(), 1);
        assert_eq!(vs[0].rule, "required");
    }

    #[test]
    fn email_shapes() {
        for bad in ["plain", "@nolocal.com", "user@nodot", "two words@x.com"] {
            let mut v = Validator::new();
            v.email("email", bad);
            assert_eq!(violations(v).len(), 1, "{bad} should fail");
        }
        let mut v = Validator::new();
        v.email("email", "user@sub.example.com");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn cross_field_equality() {
        let mut v = Validator::new();
        v.equals("password_confirmation", "secret1", "secret2", "Passwords do not match.");
        let vs = violations(v);
        assert_eq!(vs[0].message, "Passwords do not match.");
    }

    #[test]
    fn past_dates_fail_only_when_earlier_than_today() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let mut v = Validator::new();
        v.not_in_past("event_date", today, today);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.not_in_past("event_date", today.pred_opt().unwrap(), today);
        assert_eq!(violations(v)[0].message, "Event date cannot be in the past.");
    }

    #[test]
    fn optional_capacity_checks_only_when_present() {
        let mut v = Validator::new();
        v.min_value("capacity", None, 1);
        assert!(v.finish().is_ok());

        let mut v = Validator::new();
        v.min_value("capacity", Some(0), 1);
        assert_eq!(violations(v).len(), 1);
    }
}
