//! Field-level validation of untyped JSON request bodies.
//!
//! A schema reads the fields it knows about out of a JSON object and ignores
//! everything else. Problems are recorded with the path of the offending
//! field and reading carries on, so one response reports all of them.

use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> FieldError {
        FieldError {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// The state of a nullable field in a request body. On updates `Absent`
/// leaves the stored value alone while `Null` clears it.
#[derive(Clone, Debug, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Patch<T> {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Value(value) => Some(value),
            Patch::Absent | Patch::Null => None,
        }
    }

    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Value(value) => *target = Some(value),
        }
    }
}

pub trait FieldKind {
    type Output;

    fn parse(&self, value: &Value) -> Result<Self::Output, String>;
}

fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {}, received {}", expected, received(value))
}

fn string<'a>(value: &'a Value) -> Result<&'a str, String> {
    value.as_str().ok_or_else(|| mismatch("string", value))
}

fn number(value: &Value) -> Result<f64, String> {
    value.as_f64().ok_or_else(|| mismatch("number", value))
}

pub struct Text;

impl FieldKind for Text {
    type Output = String;

    fn parse(&self, value: &Value) -> Result<String, String> {
        string(value).map(str::to_owned)
    }
}

pub struct NonEmptyText;

impl FieldKind for NonEmptyText {
    type Output = String;

    fn parse(&self, value: &Value) -> Result<String, String> {
        let text = string(value)?;
        if text.is_empty() {
            return Err("must contain at least 1 character".into());
        }

        Ok(text.to_owned())
    }
}

pub struct Id<T>(PhantomData<T>);

pub fn id<T: TypedIdMarker>() -> Id<T> {
    Id(PhantomData)
}

impl<T: TypedIdMarker> FieldKind for Id<T> {
    type Output = TypedId<T>;

    fn parse(&self, value: &Value) -> Result<TypedId<T>, String> {
        string(value)?
            .parse()
            .map_err(|_| "must be a valid uuid".to_owned())
    }
}

/// A uuid that refers to a record of no particular type.
pub struct AnyId;

impl FieldKind for AnyId {
    type Output = uuid::Uuid;

    fn parse(&self, value: &Value) -> Result<uuid::Uuid, String> {
        uuid::Uuid::parse_str(string(value)?).map_err(|_| "must be a valid uuid".to_owned())
    }
}

pub struct Timestamp;

impl FieldKind for Timestamp {
    type Output = DateTime<Utc>;

    fn parse(&self, value: &Value) -> Result<DateTime<Utc>, String> {
        DateTime::parse_from_rfc3339(string(value)?)
            .map(|datetime| datetime.with_timezone(&Utc))
            .map_err(|_| "must be an ISO-8601 datetime".to_owned())
    }
}

pub struct PositiveNumber;

impl FieldKind for PositiveNumber {
    type Output = f64;

    fn parse(&self, value: &Value) -> Result<f64, String> {
        let number = number(value)?;
        if number <= 0.0 {
            return Err("must be greater than 0".into());
        }

        Ok(number)
    }
}

pub struct NonNegativeNumber;

impl FieldKind for NonNegativeNumber {
    type Output = f64;

    fn parse(&self, value: &Value) -> Result<f64, String> {
        let number = number(value)?;
        if number < 0.0 {
            return Err("must be greater than or equal to 0".into());
        }

        Ok(number)
    }
}

pub struct NonNegativeInteger;

impl FieldKind for NonNegativeInteger {
    type Output = u32;

    fn parse(&self, value: &Value) -> Result<u32, String> {
        number(value)?;
        value
            .as_u64()
            .and_then(|number| u32::try_from(number).ok())
            .ok_or_else(|| "must be a non-negative integer".to_owned())
    }
}

pub struct Flag;

impl FieldKind for Flag {
    type Output = bool;

    fn parse(&self, value: &Value) -> Result<bool, String> {
        value.as_bool().ok_or_else(|| mismatch("boolean", value))
    }
}

/// A closed set of string values.
pub trait Choice: Copy + 'static {
    fn choices() -> &'static [(&'static str, Self)];
}

pub struct OneOf<E>(PhantomData<E>);

pub fn one_of<E: Choice>() -> OneOf<E> {
    OneOf(PhantomData)
}

impl<E: Choice> FieldKind for OneOf<E> {
    type Output = E;

    fn parse(&self, value: &Value) -> Result<E, String> {
        let text = string(value)?;
        E::choices()
            .iter()
            .find(|(name, _)| *name == text)
            .map(|(_, choice)| *choice)
            .ok_or_else(|| {
                let names: Vec<&str> = E::choices().iter().map(|(name, _)| *name).collect();
                format!("expected one of {}", names.join(", "))
            })
    }
}

pub struct ObjectReader<'v, 'e> {
    path: String,
    object: Option<&'v Map<String, Value>>,
    errors: &'e mut Vec<FieldError>,
}

impl<'v, 'e> ObjectReader<'v, 'e> {
    fn new(path: String, value: &'v Value, errors: &'e mut Vec<FieldError>) -> Self {
        let object = value.as_object();
        if object.is_none() {
            errors.push(FieldError::new(path.clone(), mismatch("object", value)));
        }

        ObjectReader {
            path,
            object,
            errors,
        }
    }

    fn field_path(&self, name: &str) -> String {
        if self.path.is_empty() {
            name.to_owned()
        } else {
            format!("{}.{}", self.path, name)
        }
    }

    fn report(&mut self, name: &str, message: String) {
        let path = self.field_path(name);
        self.errors.push(FieldError::new(path, message));
    }

    fn parse_with<K: FieldKind>(&mut self, name: &str, kind: &K, value: &Value) -> Option<K::Output> {
        match kind.parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                self.report(name, message);
                None
            }
        }
    }

    pub fn required<K: FieldKind>(&mut self, name: &str, kind: K) -> Option<K::Output> {
        let object = self.object?;
        match object.get(name) {
            Some(value) => self.parse_with(name, &kind, value),
            None => {
                self.report(name, "is required".into());
                None
            }
        }
    }

    /// Reads a field that may be left out but is never null.
    pub fn optional<K: FieldKind>(&mut self, name: &str, kind: K) -> Option<K::Output> {
        let value = self.object?.get(name)?;
        self.parse_with(name, &kind, value)
    }

    pub fn nullable<K: FieldKind>(&mut self, name: &str, kind: K) -> Patch<K::Output> {
        let value = match self.object.and_then(|object| object.get(name)) {
            Some(value) => value,
            None => return Patch::Absent,
        };

        if value.is_null() {
            return Patch::Null;
        }

        match self.parse_with(name, &kind, value) {
            Some(parsed) => Patch::Value(parsed),
            None => Patch::Absent,
        }
    }

    fn array(&mut self, name: &str, min_len: usize) -> Option<&'v Vec<Value>> {
        let object = self.object?;
        let value = match object.get(name) {
            Some(value) => value,
            None => {
                self.report(name, "is required".into());
                return None;
            }
        };

        let elements = match value.as_array() {
            Some(elements) => elements,
            None => {
                self.report(name, mismatch("array", value));
                return None;
            }
        };

        if elements.len() < min_len {
            self.report(
                name,
                format!("must contain at least {} element(s)", min_len),
            );
            return None;
        }

        Some(elements)
    }

    /// Reads a required array of objects, each one through `read`.
    pub fn objects<T>(
        &mut self,
        name: &str,
        min_len: usize,
        mut read: impl FnMut(&mut ObjectReader<'v, '_>) -> Option<T>,
    ) -> Option<Vec<T>> {
        let elements = self.array(name, min_len)?;
        let base = self.field_path(name);

        let mut items = Vec::with_capacity(elements.len());
        let mut complete = true;
        for (index, element) in elements.iter().enumerate() {
            let path = format!("{}[{}]", base, index);
            let mut reader = ObjectReader::new(path, element, &mut *self.errors);
            match read(&mut reader) {
                Some(item) => items.push(item),
                None => complete = false,
            }
        }

        if complete {
            Some(items)
        } else {
            None
        }
    }

    /// Reads a required array of plain values.
    pub fn values<K: FieldKind>(
        &mut self,
        name: &str,
        min_len: usize,
        kind: K,
    ) -> Option<Vec<K::Output>> {
        let elements = self.array(name, min_len)?;
        let base = self.field_path(name);

        let mut values = Vec::with_capacity(elements.len());
        let mut complete = true;
        for (index, element) in elements.iter().enumerate() {
            match kind.parse(element) {
                Ok(value) => values.push(value),
                Err(message) => {
                    let path = format!("{}[{}]", base, index);
                    self.errors.push(FieldError::new(path, message));
                    complete = false;
                }
            }
        }

        if complete {
            Some(values)
        } else {
            None
        }
    }

    /// Records an error found by a check that spans more than one field.
    pub fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.report(name, message.into());
    }
}

/// Index of the first element equal to an earlier one.
pub fn first_duplicate<T: Eq + Hash>(items: impl IntoIterator<Item = T>) -> Option<usize> {
    let mut seen = HashSet::new();
    items.into_iter().position(|item| !seen.insert(item))
}

pub trait Schema: Sized {
    fn read(reader: &mut ObjectReader<'_, '_>) -> Option<Self>;
}

pub fn validate<S: Schema>(body: &Value) -> Result<S, Error> {
    let mut errors = vec![];
    let parsed = S::read(&mut ObjectReader::new(String::new(), body, &mut errors));

    match parsed {
        Some(parsed) if errors.is_empty() => Ok(parsed),
        _ => {
            if errors.is_empty() {
                errors.push(FieldError::new("", "is invalid"));
            }
            Err(Error::ValidationFailed { errors })
        }
    }
}
