//! Business job postings.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Criterion name → weight.
pub type RatingWeights = BTreeMap<String, f64>;

/// Backend-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job posting with its rating rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,

    /// Owning business user
    #[serde(default)]
    pub user_id: String,

    pub job_title: String,

    pub job_desc: String,

    /// Free-form rating schema (named criteria).
    ///
    /// The backend stores it as JSON text and may hand it back either way.
    #[serde(default, deserialize_with = "json_object_or_text")]
    pub rating_schema: Map<String, Value>,

    /// Optional per-criterion weights
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_weights_or_text"
    )]
    pub rating_schema_weights: Option<RatingWeights>,
}

impl Job {
    /// Criterion names, taken from `properties` when the schema is a JSON Schema
    /// document and from the top-level keys otherwise.
    pub fn criteria(&self) -> Vec<String> {
        match self.rating_schema.get("properties") {
            Some(Value::Object(props)) => props.keys().cloned().collect(),
            _ => self.rating_schema.keys().cloned().collect(),
        }
    }
}

/// Body of `POST /business/create_job`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub job_title: String,
    pub job_desc: String,
}

/// Partial update for `POST /business/edit_job`.
///
/// Fields left as `None` are omitted from the body so the backend keeps its
/// current values. The schema and weights travel as JSON-encoded strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobUpdate {
    pub job_id: JobId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_desc: Option<String>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_json_text"
    )]
    pub rating_schema: Option<Map<String, Value>>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "as_json_text"
    )]
    pub rating_schema_weights: Option<RatingWeights>,
}

impl JobUpdate {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            job_title: None,
            job_desc: None,
            rating_schema: None,
            rating_schema_weights: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.job_title = Some(title.into());
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.job_desc = Some(desc.into());
        self
    }

    pub fn schema(mut self, schema: Map<String, Value>) -> Self {
        self.rating_schema = Some(schema);
        self
    }

    pub fn weights(mut self, weights: RatingWeights) -> Self {
        self.rating_schema_weights = Some(weights);
        self
    }

    /// True when no field would be changed.
    pub fn is_empty(&self) -> bool {
        self.job_title.is_none()
            && self.job_desc.is_none()
            && self.rating_schema.is_none()
            && self.rating_schema_weights.is_none()
    }
}

fn as_json_text<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => {
            let text = serde_json::to_string(v).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&text)
        }
        None => serializer.serialize_none(),
    }
}

fn json_object_or_text<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::String(text) if text.trim().is_empty() => Ok(Map::new()),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(de::Error::custom("rating_schema is not a JSON object")),
        },
        other => Err(de::Error::custom(format!(
            "rating_schema must be an object, got {}",
            other
        ))),
    }
}

fn optional_weights_or_text<'de, D>(deserializer: D) -> Result<Option<RatingWeights>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(de::Error::custom),
        value @ Value::Object(_) => serde_json::from_value(value)
            .map(Some)
            .map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "rating_schema_weights must be an object, got {}",
            other
        ))),
    }
}
