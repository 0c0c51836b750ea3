//! Server-side validation of submitted HTML forms.
//!
//! A [`Form`] wraps the posted values and collects per-field error
//! messages as checks run. Checks never short-circuit each other; the first
//! message recorded for a field is the one shown next to it.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /// Loose RFC 5322 address check: dot-atom local part, dotted hostname
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).unwrap();
}

pub const BLANK_MESSAGE: &str = "This field cannot be blank.";
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email address.";

/// Posted values; a field may be submitted more than once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(HashMap<String, Vec<String>>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = Self::new();
        for (key, value) in pairs {
            values.add(key, value);
        }
        values
    }

    pub fn add(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(value.into());
    }

    /// First submitted value, or `""` when the field is absent
    pub fn get(&self, field: &str) -> &str {
        self.0
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Field name to messages, in the order the checks recorded them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// First message for `field`, or `""`
    pub fn get(&self, field: &str) -> &str {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.get(field).is_some_and(|messages| !messages.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub values: FormValues,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: FormValues) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// True when the field was submitted with a non-blank value
    pub fn has(&self, field: &str) -> bool {
        !self.values.get(field).trim().is_empty()
    }

    pub fn required(&mut self, fields: &[&str]) -> &mut Self {
        for field in fields {
            if !self.has(field) {
                self.errors.add(*field, BLANK_MESSAGE);
            }
        }
        self
    }

    /// Length is counted in characters of the trimmed value. A blank field
    /// is left to `required`.
    pub fn min_length(&mut self, field: &str, length: usize) -> bool {
        if !self.has(field) {
            return true;
        }

        if self.values.get(field).trim().chars().count() < length {
            self.errors.add(
                field,
                format!("This field must be at least {} characters long", length),
            );
            return false;
        }

        true
    }

    /// A blank field is left to `required`
    pub fn is_email(&mut self, field: &str) -> bool {
        if !self.has(field) {
            return true;
        }

        if !EMAIL_REGEX.is_match(self.values.get(field).trim()) {
            self.errors.add(field, INVALID_EMAIL_MESSAGE);
            return false;
        }

        true
    }

    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}
