// Field checks shared by the ring 1 validators

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::observer::context::ObserverContext;
use crate::observer::error::ObserverError;

pub static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("static regex")
});

pub static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)$",
    )
    .expect("static regex")
});

/// Collects every failing message for one document
pub struct FieldChecks<'a> {
    ctx: &'a ObserverContext,
    messages: Vec<String>,
}

impl<'a> FieldChecks<'a> {
    pub fn new(ctx: &'a ObserverContext) -> Self {
        Self { ctx, messages: Vec::new() }
    }

    fn fail(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn text(&self, field: &str) -> Option<&'a str> {
        self.ctx.get_str(field)
    }

    /// Present and, for strings, not blank
    pub fn required(&mut self, field: &str, message: &str) -> bool {
        let present = match self.ctx.get(field) {
            None => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };
        if !present {
            self.fail(message);
        }
        present
    }

    pub fn max_len(&mut self, field: &str, max: usize, message: &str) {
        if self.text(field).is_some_and(|s| s.chars().count() > max) {
            self.fail(message);
        }
    }

    pub fn min_len(&mut self, field: &str, min: usize, message: &str) {
        if self.text(field).is_some_and(|s| s.chars().count() < min) {
            self.fail(message);
        }
    }

    pub fn pattern(&mut self, field: &str, pattern: &Regex, message: &str) {
        if self.text(field).is_some_and(|s| !pattern.is_match(s)) {
            self.fail(message);
        }
    }

    pub fn one_of(&mut self, field: &str, allowed: &[&str], message: &str) {
        let invalid = self
            .ctx
            .get(field)
            .is_some_and(|value| !value.as_str().is_some_and(|s| allowed.contains(&s)));
        if invalid {
            self.fail(message);
        }
    }

    /// Every element of a string list is one of `allowed`
    pub fn each_one_of(&mut self, field: &str, allowed: &[&str], message: &str) {
        let invalid = match self.ctx.get(field) {
            Some(Value::Array(items)) => items.iter().any(|v| !v.as_str().is_some_and(|s| allowed.contains(&s))),
            Some(_) => true,
            None => false,
        };
        if invalid {
            self.fail(message);
        }
    }

    pub fn range(&mut self, field: &str, min: f64, max: f64, message: &str) {
        let invalid = self
            .ctx
            .get(field)
            .filter(|value| !value.is_null())
            .is_some_and(|value| !value.as_f64().is_some_and(|n| (min..=max).contains(&n)));
        if invalid {
            self.fail(message);
        }
    }

    pub fn finish(self) -> Result<(), ObserverError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ObserverError::ValidationError(self.messages))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(EMAIL_PATTERN.is_match("john@gmail.com"));
        assert!(EMAIL_PATTERN.is_match("first.last@mail.co.uk"));
        assert!(!EMAIL_PATTERN.is_match("john@gmail"));
        assert!(!EMAIL_PATTERN.is_match("not an email"));
    }

    #[test]
    fn url_pattern() {
        assert!(URL_PATTERN.is_match("https://devworks.com"));
        assert!(URL_PATTERN.is_match("http://www.modernwebdev.io/courses"));
        assert!(!URL_PATTERN.is_match("ftp://devworks.com"));
        assert!(!URL_PATTERN.is_match("devworks"));
    }
}
