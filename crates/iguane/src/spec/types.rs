use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::IguaneError;

/// A literal value as written in the GPU data file.
///
/// Only the descriptive fields of a record keep their raw [`Value`];
/// the numeric hardware fields are coerced into [`HardwareRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short description of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "None",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "string",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Numeric hardware attribute read by the scoring formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Fp16,
    Fp32,
    Fp64,
    Tf32,
    Memgb,
    Membw,
}

impl Field {
    pub const ALL: [Self; 6] = [
        Self::Fp16,
        Self::Fp32,
        Self::Fp64,
        Self::Tf32,
        Self::Memgb,
        Self::Membw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fp16 => "fp16",
            Self::Fp32 => "fp32",
            Self::Fp64 => "fp64",
            Self::Tf32 => "tf32",
            Self::Memgb => "memgb",
            Self::Membw => "membw",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == key)
    }

    /// Throughput fields may be null; memory fields are always present.
    pub fn is_nullable(self) -> bool {
        matches!(self, Self::Fp16 | Self::Fp32 | Self::Fp64 | Self::Tf32)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hardware characteristics of one GPU model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareRecord {
    /// Model name; the table key. Not serialized inside the record.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub fp16: Option<f64>,
    #[serde(default)]
    pub fp32: Option<f64>,
    #[serde(default)]
    pub fp64: Option<f64>,
    #[serde(default)]
    pub tf32: Option<f64>,
    pub memgb: f64,
    pub membw: f64,
    /// Descriptive fields (vendor, arch, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl HardwareRecord {
    /// Raw value of `field`, `None` when the data file says `None`.
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Fp16 => self.fp16,
            Field::Fp32 => self.fp32,
            Field::Fp64 => self.fp64,
            Field::Tf32 => self.tf32,
            Field::Memgb => Some(self.memgb),
            Field::Membw => Some(self.membw),
        }
    }

    /// Value of `field` with `fp16` and `tf32` falling back to `fp32`.
    pub fn get_or_fallback(&self, field: Field) -> Option<f64> {
        match field {
            Field::Fp16 | Field::Tf32 => self.get(field).or(self.fp32),
            _ => self.get(field),
        }
    }

    /// Like [`get_or_fallback`](Self::get_or_fallback), but a null is an error.
    pub fn require(&self, field: Field) -> Result<f64, IguaneError> {
        self.get_or_fallback(field)
            .ok_or_else(|| IguaneError::MissingField {
                gpu: self.name.clone(),
                field: field.to_string(),
            })
    }

    pub fn vendor(&self) -> Option<&str> {
        self.extra.get("vendor").and_then(Value::as_str)
    }

    pub fn arch(&self) -> Option<&str> {
        self.extra.get("arch").and_then(Value::as_str)
    }
}

/// Immutable GPU name → [`HardwareRecord`] table, ordered by name.
///
/// Built once by the loaders in [`crate::spec`]; there is no public way to
/// add, remove or modify an entry afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SpecTable {
    records: BTreeMap<String, HardwareRecord>,
}

impl SpecTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a record, handing back the record when its name is taken.
    pub(crate) fn insert(&mut self, record: HardwareRecord) -> Result<(), HardwareRecord> {
        if self.records.contains_key(&record.name) {
            return Err(record);
        }
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&HardwareRecord> {
        self.records.get(name)
    }

    /// Exact, case-sensitive lookup.
    pub fn record(&self, name: &str) -> Result<&HardwareRecord, IguaneError> {
        self.get(name)
            .ok_or_else(|| IguaneError::UnknownGpu(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HardwareRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize as a JSON object keyed by GPU name.
    pub fn to_json_pretty(&self) -> Result<String, IguaneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
