//! Request validation.
//!
//! Each endpoint's rules are written against a [`Validator`] that walks the raw
//! JSON object, records every failing field, and hands back typed values. A
//! request is rejected only after all of its fields have been checked.

pub mod task_types;
pub mod tasks;
pub mod users;

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use taskboard_types::api::FieldError;

use crate::error::{ApiError, Entity};

static CALENDAR_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid calendar day pattern"));

/// Length bounds for a text field, counted in characters.
pub struct TextRule {
    pub min: usize,
    pub max: usize,
    pub too_short: &'static str,
    pub too_long: &'static str,
}

pub struct Validator<'a> {
    body: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

/// Borrows the body as a JSON object, rejecting any other JSON value outright.
pub fn object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object().ok_or_else(|| {
        ApiError::field(
            "body",
            format!("Expected object, received {}", type_name(body)),
        )
    })
}

/// Path identifiers are positive base-10 integers.
pub fn parse_id(raw: &str, entity: Entity) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::InvalidId(entity)),
    }
}

/// Zero-padded `YYYY-MM-DD` or a full RFC 3339 timestamp. SQLite's `DATE()`
/// understands both; it returns NULL for unpadded days.
pub fn is_date(value: &str) -> bool {
    (CALENDAR_DAY.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok())
        || DateTime::parse_from_rfc3339(value).is_ok()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<'a> Validator<'a> {
    pub fn new(body: &'a Map<String, Value>) -> Self {
        Self {
            body,
            errors: Vec::new(),
        }
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Records `message` against `field` unless `ok`.
    pub fn ensure(&mut self, field: &str, ok: bool, message: &str) {
        if !ok {
            self.fail(field, message);
        }
    }

    /// A string that must be present.
    pub fn required_text(&mut self, field: &str, rule: &TextRule) -> Option<String> {
        match self.body.get(field) {
            None => {
                self.fail(field, "Required");
                None
            }
            Some(value) => self.text(field, value, rule),
        }
    }

    /// A string that may be omitted but not null.
    pub fn optional_text(&mut self, field: &str, rule: &TextRule) -> Option<String> {
        let value = self.body.get(field)?;
        self.text(field, value, rule)
    }

    /// A string that may be omitted (`None`) or null (`Some(None)`).
    pub fn nullable_text(&mut self, field: &str, rule: &TextRule) -> Option<Option<String>> {
        match self.body.get(field)? {
            Value::Null => Some(None),
            value => self.text(field, value, rule).map(Some),
        }
    }

    /// Like [`Self::nullable_text`], except an empty string also means null.
    /// Non-empty values must satisfy `accept`.
    pub fn blank_as_null(
        &mut self,
        field: &str,
        accept: fn(&str) -> bool,
        message: &str,
    ) -> Option<Option<String>> {
        match self.body.get(field)? {
            Value::String(s) if s.is_empty() => Some(None),
            _ => self.nullable_format(field, accept, message),
        }
    }

    /// A nullable string that must satisfy `accept`.
    pub fn nullable_format(
        &mut self,
        field: &str,
        accept: fn(&str) -> bool,
        message: &str,
    ) -> Option<Option<String>> {
        match self.body.get(field)? {
            Value::Null => Some(None),
            Value::String(s) if accept(s) => Some(Some(s.clone())),
            Value::String(_) => {
                self.fail(field, message);
                None
            }
            other => {
                self.mismatch(field, "string", other);
                None
            }
        }
    }

    pub fn required_enum<T: FromStr>(&mut self, field: &str, message: &str) -> Option<T> {
        if !self.body.contains_key(field) {
            self.fail(field, message);
            return None;
        }
        self.optional_enum(field, message)
    }

    pub fn optional_enum<T: FromStr>(&mut self, field: &str, message: &str) -> Option<T> {
        let parsed = match self.body.get(field)? {
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.fail(field, message);
        }
        parsed
    }

    /// A positive integer reference that may be omitted or null.
    pub fn nullable_id(&mut self, field: &str) -> Option<Option<i64>> {
        match self.body.get(field)? {
            Value::Null => Some(None),
            Value::Number(n) => match n.as_i64() {
                Some(id) if id > 0 => Some(Some(id)),
                Some(_) => {
                    self.fail(field, "Number must be greater than 0");
                    None
                }
                None if n.is_f64() => {
                    self.fail(field, "Expected integer, received float");
                    None
                }
                None => {
                    self.fail(field, "Number is too large");
                    None
                }
            },
            other => {
                self.mismatch(field, "number", other);
                None
            }
        }
    }

    /// Ok when nothing failed.
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }

    /// The collected failures. Only meaningful once a required field came back `None`.
    pub fn into_error(self) -> ApiError {
        ApiError::Validation(self.errors)
    }

    fn text(&mut self, field: &str, value: &Value, rule: &TextRule) -> Option<String> {
        let Value::String(s) = value else {
            self.mismatch(field, "string", value);
            return None;
        };

        let len = s.chars().count();
        if len < rule.min {
            self.fail(field, rule.too_short);
            None
        } else if len > rule.max {
            self.fail(field, rule.too_long);
            None
        } else {
            Some(s.clone())
        }
    }

    fn mismatch(&mut self, field: &str, expected: &str, got: &Value) {
        self.fail(
            field,
            format!("Expected {}, received {}", expected, type_name(got)),
        );
    }
}
