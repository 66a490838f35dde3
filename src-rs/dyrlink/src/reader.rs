//! Reading records, seed devices and rule files from JSON

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use dyrlink_ir::{DeviceKey, DeviceType, FieldName, ModelType, RawRecord, ResolvedDevice, Value};
use dyrlink_schema::SchemaDef;
use dyrlink_shared::error::{AsDyrlinkError, Context};
use indexmap::IndexMap;
use serde::{Deserialize, de::DeserializeOwned};

/// A record as it appears in a record file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordEntry {
    model: String,
    fields: IndexMap<String, Option<FieldValue>>,
}

/// A device as it appears in a seed file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SeedEntry {
    #[serde(rename = "type")]
    device_type: String,
    key: SeedKey,
    #[serde(default)]
    fields: IndexMap<String, Option<FieldValue>>,
}

/// A seed key, either a single component or the components of a composite
/// key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedKey {
    Single(String),
    Composite(Vec<String>),
}

impl From<SeedKey> for DeviceKey {
    fn from(key: SeedKey) -> Self {
        match key {
            SeedKey::Single(key) => Self::new(key),
            SeedKey::Composite(components) => Self::from_components(components),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(f64),
    String(String),
    Sequence(Vec<Option<f64>>),
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Number(number) => Self::Number(number),
            FieldValue::String(string) => Self::String(string),
            FieldValue::Sequence(points) => Self::Sequence(points),
        }
    }
}

fn convert_fields(fields: IndexMap<String, Option<FieldValue>>) -> IndexMap<FieldName, Value> {
    fields
        .into_iter()
        .map(|(field, value)| (FieldName::new(field), value.map_or(Value::Absent, Value::from)))
        .collect()
}

/// Reads the records of a record file, in file order.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>, ReadError> {
    let entries: Vec<RecordEntry> = read_json(path, FileKind::Records)?;

    Ok(entries
        .into_iter()
        .map(|entry| RawRecord::new(ModelType::new(entry.model), convert_fields(entry.fields)))
        .collect())
}

/// Reads the devices of a seed file.
pub fn read_seed(path: &Path) -> Result<Vec<ResolvedDevice>, ReadError> {
    let entries: Vec<SeedEntry> = read_json(path, FileKind::Seed)?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            ResolvedDevice::new(
                DeviceType::new(entry.device_type),
                DeviceKey::from(entry.key),
                convert_fields(entry.fields),
            )
        })
        .collect())
}

/// Reads a file of groups and rule set definitions.
pub fn read_rules(path: &Path) -> Result<SchemaDef, ReadError> {
    read_json(path, FileKind::Rules)
}

fn read_json<T: DeserializeOwned>(path: &Path, kind: FileKind) -> Result<T, ReadError> {
    let contents = fs::read_to_string(path).map_err(|error| ReadError::io(path, &error))?;
    let parsed = serde_json::from_str(&contents).map_err(|error| ReadError::json(path, kind, &error))?;
    tracing::debug!(path = %path.display(), kind = %kind, "read input file");
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Records,
    Seed,
    Rules,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Records => write!(f, "record file"),
            Self::Seed => write!(f, "seed file"),
            Self::Rules => write!(f, "rule file"),
        }
    }
}

/// An input file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// The file could not be opened or read.
    Io { path: PathBuf, reason: String },
    /// The file is not valid JSON of the expected shape.
    Json {
        path: PathBuf,
        kind: FileKind,
        reason: String,
    },
}

impl ReadError {
    fn io(path: &Path, error: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            reason: error.to_string(),
        }
    }

    fn json(path: &Path, kind: FileKind, error: &serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            kind,
            reason: error.to_string(),
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => {
                write!(f, "couldn't read `{}`: {reason}", path.display())
            }
            Self::Json { path, kind, reason } => {
                write!(f, "invalid {kind} `{}`: {reason}", path.display())
            }
        }
    }
}

impl AsDyrlinkError for ReadError {
    fn message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Vec<Context> {
        match self {
            Self::Io { .. } => vec![],
            Self::Json {
                kind: FileKind::Records,
                ..
            } => vec![Context::Help(
                "a record file is a JSON array of `{ \"model\": ..., \"fields\": { ... } }` objects"
                    .to_string(),
            )],
            Self::Json {
                kind: FileKind::Seed,
                ..
            } => vec![Context::Help(
                "a seed file is a JSON array of `{ \"type\": ..., \"key\": ..., \"fields\": { ... } }` objects, where a composite key is an array of strings"
                    .to_string(),
            )],
            Self::Json {
                kind: FileKind::Rules,
                ..
            } => vec![Context::Help(
                "a rule file is a JSON object with `groups` and `rule_sets` arrays".to_string(),
            )],
        }
    }
}
