//! Book payload validation.
//!
//! Payloads are checked against a fixed field table before anything reaches
//! the repository:
//! - every declared field is present and non-null
//! - strings are JSON strings, integers are JSON integers (no coercion)
//! - `isbn` is non-empty, `pages` is positive, `amazon_url` is an absolute URI
//! - undeclared fields are rejected
//! - on update, the body `isbn` must equal the path `isbn`
//!
//! All failures are collected so the client sees every problem at once.

use axum::http::Uri;
use serde::Serialize;
use serde_json::{Map, Value};

use super::models::Book;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    Text,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Any,
    NonEmpty,
    Positive,
    AbsoluteUri,
}

struct FieldDef {
    name: &'static str,
    field_type: FieldType,
    rule: Rule,
}

const fn field(name: &'static str, field_type: FieldType, rule: Rule) -> FieldDef {
    FieldDef {
        name,
        field_type,
        rule,
    }
}

const BOOK_FIELDS: &[FieldDef] = &[
    field("isbn", FieldType::Text, Rule::NonEmpty),
    field("amazon_url", FieldType::Text, Rule::AbsoluteUri),
    field("author", FieldType::Text, Rule::Any),
    field("language", FieldType::Text, Rule::Any),
    field("pages", FieldType::Integer, Rule::Positive),
    field("publisher", FieldType::Text, Rule::Any),
    field("title", FieldType::Text, Rule::Any),
    field("year", FieldType::Integer, Rule::Any),
];

/// Which operation the payload is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode<'a> {
    Create,
    /// Full replacement of the record identified by `isbn`
    Update { isbn: &'a str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Missing,
    Type,
    Format,
    Unknown,
    Immutable,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Validate `payload` and turn it into a [`Book`].
pub fn validate(payload: &Value, mode: ValidationMode<'_>) -> Result<Book, Vec<FieldError>> {
    let Some(obj) = payload.as_object() else {
        return Err(vec![FieldError::new(
            "$root",
            FieldErrorKind::Type,
            format!("expected object, got {}", json_type_name(payload)),
        )]);
    };

    let mut errors: Vec<FieldError> = BOOK_FIELDS
        .iter()
        .filter_map(|def| check_field(obj, def).err())
        .collect();

    errors.extend(
        obj.keys()
            .filter(|key| !BOOK_FIELDS.iter().any(|def| def.name == key.as_str()))
            .map(|key| FieldError::new(key.as_str(), FieldErrorKind::Unknown, "undeclared field")),
    );

    if let ValidationMode::Update { isbn } = mode {
        if let Some(body_isbn) = obj.get("isbn").and_then(Value::as_str) {
            if body_isbn != isbn {
                errors.push(FieldError::new(
                    "isbn",
                    FieldErrorKind::Immutable,
                    format!("isbn is immutable: expected '{isbn}', got '{body_isbn}'"),
                ));
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value(payload.clone())
        .map_err(|e| vec![FieldError::new("$root", FieldErrorKind::Type, e.to_string())])
}

fn check_field(obj: &Map<String, Value>, def: &FieldDef) -> Result<(), FieldError> {
    let value = match obj.get(def.name) {
        None | Some(Value::Null) => {
            return Err(FieldError::new(
                def.name,
                FieldErrorKind::Missing,
                format!("{} is required", def.name),
            ))
        }
        Some(value) => value,
    };

    match def.field_type {
        FieldType::Text => {
            let Some(text) = value.as_str() else {
                return Err(type_error(def, "string", value));
            };
            match def.rule {
                Rule::NonEmpty if text.trim().is_empty() => Err(FieldError::new(
                    def.name,
                    FieldErrorKind::Format,
                    format!("{} must not be empty", def.name),
                )),
                Rule::AbsoluteUri if !is_absolute_uri(text) => Err(FieldError::new(
                    def.name,
                    FieldErrorKind::Format,
                    format!("{} must be an absolute URI", def.name),
                )),
                _ => Ok(()),
            }
        }
        FieldType::Integer => {
            let Some(number) = value.as_i64() else {
                if value.is_u64() {
                    return Err(FieldError::new(
                        def.name,
                        FieldErrorKind::Format,
                        format!("{} is out of range", def.name),
                    ));
                }
                return Err(type_error(def, "integer", value));
            };
            match def.rule {
                Rule::Positive if number <= 0 => Err(FieldError::new(
                    def.name,
                    FieldErrorKind::Format,
                    format!("{} must be positive", def.name),
                )),
                _ => Ok(()),
            }
        }
    }
}

fn is_absolute_uri(text: &str) -> bool {
    text.parse::<Uri>()
        .map(|uri| uri.scheme().is_some() && uri.host().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

fn type_error(def: &FieldDef, expected: &str, actual: &Value) -> FieldError {
    FieldError::new(
        def.name,
        FieldErrorKind::Type,
        format!("expected {expected}, got {}", json_type_name(actual)),
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn power_up() -> Value {
        json!({
            "isbn": "0691161518",
            "amazon_url": "http://a.co/eobPtX2",
            "author": "Matthew Lane",
            "language": "english",
            "pages": 264,
            "publisher": "Princeton University Press",
            "title": "Power-Up: Unlocking the Hidden Mathematics in Video Games",
            "year": 2017
        })
    }

    fn fields(errors: &[FieldError]) -> Vec<(&str, FieldErrorKind)> {
        errors.iter().map(|e| (e.field.as_str(), e.kind)).collect()
    }

    #[test]
    fn accepts_complete_book() {
        let book = validate(&power_up(), ValidationMode::Create).unwrap();
        assert_eq!(book.isbn, "0691161518");
        assert_eq!(book.pages, 264);
        assert_eq!(book.year, 2017);
    }

    #[test]
    fn isbn_only_reports_every_missing_field() {
        let errors = validate(&json!({"isbn": "1338878921"}), ValidationMode::Create).unwrap_err();
        assert_eq!(
            fields(&errors),
            [
                ("amazon_url", FieldErrorKind::Missing),
                ("author", FieldErrorKind::Missing),
                ("language", FieldErrorKind::Missing),
                ("pages", FieldErrorKind::Missing),
                ("publisher", FieldErrorKind::Missing),
                ("title", FieldErrorKind::Missing),
                ("year", FieldErrorKind::Missing),
            ]
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let mut payload = power_up();
        payload["title"] = Value::Null;
        let errors = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(fields(&errors), [("title", FieldErrorKind::Missing)]);
    }

    #[test]
    fn no_type_coercion() {
        let mut payload = power_up();
        payload["pages"] = json!("264");
        payload["year"] = json!(2017.5);
        payload["author"] = json!(42);
        let errors = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(
            fields(&errors),
            [
                ("author", FieldErrorKind::Type),
                ("pages", FieldErrorKind::Type),
                ("year", FieldErrorKind::Type),
            ]
        );
        assert_eq!(errors[1].message, "expected integer, got string");
    }

    #[test]
    fn rejects_non_positive_pages_and_relative_url() {
        let mut payload = power_up();
        payload["pages"] = json!(0);
        payload["amazon_url"] = json!("not a url");
        let errors = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(
            fields(&errors),
            [
                ("amazon_url", FieldErrorKind::Format),
                ("pages", FieldErrorKind::Format),
            ]
        );
    }

    #[test]
    fn integer_beyond_i64_is_out_of_range() {
        let mut payload = power_up();
        payload["pages"] = json!(u64::MAX);
        let errors = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(fields(&errors), [("pages", FieldErrorKind::Format)]);
        assert_eq!(errors[0].message, "pages is out of range");
    }

    #[test]
    fn rejects_empty_isbn() {
        let mut payload = power_up();
        payload["isbn"] = json!("  ");
        let errors = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(fields(&errors), [("isbn", FieldErrorKind::Format)]);
    }

    #[test]
    fn rejects_undeclared_fields() {
        let mut payload = power_up();
        payload["edition"] = json!(2);
        let errors = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(fields(&errors), [("edition", FieldErrorKind::Unknown)]);
    }

    #[test]
    fn rejects_non_object_payload() {
        let errors = validate(&json!([1, 2]), ValidationMode::Create).unwrap_err();
        assert_eq!(fields(&errors), [("$root", FieldErrorKind::Type)]);
        assert_eq!(errors[0].message, "expected object, got array");
    }

    #[test]
    fn update_requires_matching_isbn() {
        let ok = validate(&power_up(), ValidationMode::Update { isbn: "0691161518" });
        assert!(ok.is_ok());

        let errors =
            validate(&power_up(), ValidationMode::Update { isbn: "1338878921" }).unwrap_err();
        assert_eq!(fields(&errors), [("isbn", FieldErrorKind::Immutable)]);
    }

    #[test]
    fn update_requires_full_record() {
        let errors = validate(
            &json!({"isbn": "0691161518", "year": 2024}),
            ValidationMode::Update { isbn: "0691161518" },
        )
        .unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.iter().all(|e| e.kind == FieldErrorKind::Missing));
    }
}
