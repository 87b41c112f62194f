// Issue domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const STATE_OPENED: &str = "opened";
pub const STATE_CLOSED: &str = "closed";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Assignee {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Milestone {
    pub title: String,
}

/// A tracker issue. The typed fields cover what the dashboard renders; the raw
/// JSON object is kept alongside so rule conditions can address any attribute
/// by dot path.
#[derive(Debug, Clone)]
pub struct Issue {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    pub state: String,
    pub labels: Vec<String>,
    pub assignee: Option<Assignee>,
    pub milestone: Option<Milestone>,
    pub web_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    attributes: Map<String, Value>,
}

#[derive(Deserialize)]
struct IssueFields {
    id: u64,
    #[serde(default)]
    iid: u64,
    project_id: u64,
    #[serde(default)]
    title: String,
    state: String,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    assignee: Option<Assignee>,
    #[serde(default)]
    milestone: Option<Milestone>,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn from_attributes(attributes: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let fields: IssueFields = serde_json::from_value(Value::Object(attributes.clone()))?;
        Ok(Self {
            id: fields.id,
            iid: fields.iid,
            project_id: fields.project_id,
            title: fields.title,
            state: fields.state,
            labels: fields.labels,
            assignee: fields.assignee,
            milestone: fields.milestone,
            web_url: fields.web_url,
            updated_at: fields.updated_at,
            attributes,
        })
    }

    #[cfg(test)]
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.state == STATE_CLOSED
    }

    /// Walk a dot-separated path through the issue's attribute map.
    /// Returns `None` when a segment is missing or the value at some
    /// intermediate segment is not an object.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.attributes.get(first)?;

        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        Some(current)
    }
}

impl<'de> Deserialize<'de> for Issue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let attributes = Map::<String, Value>::deserialize(deserializer)?;
        Issue::from_attributes(attributes).map_err(serde::de::Error::custom)
    }
}
