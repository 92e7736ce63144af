//! Declarative request validation for inbound HTTP adapters.
//!
//! A [`Schema`] lists per-field rules over the three request parts (path
//! parameters, query string, JSON body). Checking is exhaustive: every
//! violated rule yields one [`FieldViolation`] whose path is rooted at the
//! request part (`params.id`, `body.email`). Fields a schema does not
//! mention pass through untouched.

use std::collections::HashMap;
use std::sync::OnceLock;

use actix_web::HttpRequest;
use actix_web::web::Query;
use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::user::user_id_regex;
use crate::domain::{Error, FieldViolation};

const REQUIRED: &str = "Required";

/// Request part a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Path parameters.
    Params,
    /// Query string.
    Query,
    /// JSON body.
    Body,
}

impl Location {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Params => "params",
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

/// Constraint applied to a string-valued field.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Character count within `min..=max`.
    Text {
        /// Fewest characters accepted.
        min: usize,
        /// Most characters accepted.
        max: usize,
        /// Message when shorter than `min`.
        too_short: &'static str,
        /// Message when longer than `max`.
        too_long: &'static str,
    },
    /// Email address syntax.
    Email {
        /// Message when malformed.
        message: &'static str,
    },
    /// One of a closed set of values.
    OneOf {
        /// Accepted values.
        values: &'static [&'static str],
    },
    /// Full match against a regular expression.
    Pattern {
        /// Compiled expression.
        regex: fn() -> &'static Regex,
        /// Message when the value does not match.
        message: &'static str,
    },
}

/// One field of a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    location: Location,
    name: &'static str,
    required: bool,
    rule: Rule,
}

impl FieldRule {
    /// A field that must be present.
    pub const fn required(location: Location, name: &'static str, rule: Rule) -> Self {
        Self {
            location,
            name,
            required: true,
            rule,
        }
    }

    /// A field checked only when present.
    pub const fn optional(location: Location, name: &'static str, rule: Rule) -> Self {
        Self {
            location,
            name,
            required: false,
            rule,
        }
    }

    fn path(&self) -> String {
        format!("{}.{}", self.location.as_str(), self.name)
    }
}

/// Ordered set of field rules.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldRule],
}

/// Path, query, and body of one request as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestInput {
    params: Map<String, Value>,
    query: Map<String, Value>,
    body: Value,
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9_'+\-.]*[A-Z0-9_+\-]@([A-Z0-9][A-Z0-9\-]*\.)+[A-Z]{2,}$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email syntax check shared by every schema.
///
/// ```
/// use user_service::inbound::http::validation::is_email;
///
/// assert!(is_email("ada@example.com"));
/// assert!(!is_email("ada@localhost"));
/// assert!(!is_email("ada..lovelace@example.com"));
/// ```
pub fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && email_regex().is_match(value)
}

fn one_of_message(values: &[&str]) -> String {
    let expected = values
        .iter()
        .map(|value| format!("'{value}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("Invalid enum value. Expected {expected}")
}

impl Rule {
    fn check(&self, value: &str) -> Option<String> {
        match *self {
            Self::Text {
                min,
                max,
                too_short,
                too_long,
            } => {
                let length = value.chars().count();
                if length < min {
                    Some(too_short.to_owned())
                } else if length > max {
                    Some(too_long.to_owned())
                } else {
                    None
                }
            }
            Self::Email { message } => (!is_email(value)).then(|| message.to_owned()),
            Self::OneOf { values } => {
                (!values.contains(&value)).then(|| one_of_message(values))
            }
            Self::Pattern { regex, message } => {
                (!regex().is_match(value)).then(|| message.to_owned())
            }
        }
    }
}

impl Schema {
    /// Schema over `fields`, checked in order.
    pub const fn new(fields: &'static [FieldRule]) -> Self {
        Self { fields }
    }

    /// Every violation in `input`, in schema order.
    pub fn violations(&self, input: &RequestInput) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        let body = input.body.as_object();
        let checks_body = self
            .fields
            .iter()
            .any(|field| field.location == Location::Body);
        if checks_body && body.is_none() {
            violations.push(FieldViolation::new(
                Location::Body.as_str(),
                format!("Expected object, received {}", json_type(&input.body)),
            ));
        }

        for field in self.fields {
            let part = match field.location {
                Location::Params => Some(&input.params),
                Location::Query => Some(&input.query),
                Location::Body => body,
            };
            let Some(part) = part else { continue };
            match part.get(field.name) {
                None if field.required => {
                    violations.push(FieldViolation::new(field.path(), REQUIRED));
                }
                None => {}
                Some(Value::String(text)) => {
                    if let Some(message) = field.rule.check(text) {
                        violations.push(FieldViolation::new(field.path(), message));
                    }
                }
                Some(other) => violations.push(FieldViolation::new(
                    field.path(),
                    format!("Expected string, received {}", json_type(other)),
                )),
            }
        }
        violations
    }

    /// `Ok` when `input` satisfies every rule, otherwise a validation error
    /// listing each violation.
    pub fn check(&self, input: &RequestInput) -> Result<(), Error> {
        let violations = self.violations(input);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(violations))
        }
    }
}

impl RequestInput {
    /// Assemble input from already-decoded parts.
    pub fn new(params: Map<String, Value>, query: Map<String, Value>, body: Value) -> Self {
        Self {
            params,
            query,
            body,
        }
    }

    /// Read path parameters and the query string from `req` and decode
    /// `payload` as JSON. An empty payload reads as `{}`.
    ///
    /// # Errors
    ///
    /// Malformed JSON is reported as a validation error at `body`.
    pub fn from_request(req: &HttpRequest, payload: &[u8]) -> Result<Self, Error> {
        let params = req
            .match_info()
            .iter()
            .map(|(name, value)| (name.to_owned(), Value::String(value.to_owned())))
            .collect();
        let query = Query::<HashMap<String, String>>::from_query(req.query_string())
            .map(|query| {
                query
                    .into_inner()
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self::new(params, query, parse_body(payload)?))
    }

    /// Path parameter `name`, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    /// Decoded body.
    pub const fn body(&self) -> &Value {
        &self.body
    }
}

/// Decode a request payload. An empty or whitespace-only payload reads as
/// `{}`.
///
/// # Errors
///
/// Malformed JSON is reported as a validation error at `body`.
pub fn parse_body(payload: &[u8]) -> Result<Value, Error> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(payload).map_err(|error| {
        Error::validation(vec![FieldViolation::new(
            Location::Body.as_str(),
            format!("Malformed JSON: {error}"),
        )])
    })
}

/// Identifier rule shared by every `/{id}` route.
pub const ID_PARAM: FieldRule = FieldRule::required(
    Location::Params,
    "id",
    Rule::Pattern {
        regex: user_id_regex,
        message: "Invalid identifier format",
    },
);
