use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Attribute a provider can report for a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Name,
    FormattedAddress,
    Country,
    CountryCode,
    Region,
    City,
    Postcode,
    Street,
    StreetNumber,
    Latitude,
    Longitude,
    Phone,
    Website,
    YearFounded,
    EmployeeCount,
    Description,
    Email,
    Facebook,
    Linkedin,
    Twitter,
    Instagram,
    Youtube,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Integer(_) => false,
            FieldValue::Float(value) => !value.is_finite(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// Attributes one provider returned for one lookup. Empty values are never
/// stored, so a missing attribute and a blank one read the same.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialRecord {
    values: BTreeMap<Attribute, FieldValue>,
}

impl PartialRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Into<FieldValue>>(&mut self, attribute: Attribute, value: Option<V>) {
        let Some(value) = value.map(Into::into) else {
            return;
        };
        if value.is_empty() {
            return;
        }
        self.values.insert(attribute, value);
    }

    pub fn with<V: Into<FieldValue>>(mut self, attribute: Attribute, value: V) -> Self {
        self.set(attribute, Some(value));
        self
    }

    pub fn get(&self, attribute: Attribute) -> Option<&FieldValue> {
        self.values.get(&attribute)
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.values.contains_key(&attribute)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &FieldValue)> {
        self.values.iter().map(|(attribute, value)| (*attribute, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What a provider adapter hands back instead of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(PartialRecord),
    NoMatch,
    Failed(String),
}

impl LookupOutcome {
    pub fn failed(reason: impl fmt::Display) -> Self {
        LookupOutcome::Failed(reason.to_string())
    }

    pub fn record(&self) -> &PartialRecord {
        static EMPTY: PartialRecord = PartialRecord {
            values: BTreeMap::new(),
        };
        match self {
            LookupOutcome::Found(record) => record,
            LookupOutcome::NoMatch | LookupOutcome::Failed(_) => &EMPTY,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LookupOutcome::Failed(_))
    }
}
