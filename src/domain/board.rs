// Board, group and project models as returned by the issue tracker
use super::issue::{Assignee, Milestone};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// One column descriptor of a board. Milestone lists come back with neither
/// a label nor an assignee. Fields that do not have the expected shape are
/// read as absent, so a malformed list becomes a placeholder column.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BoardList {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub position: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub label: Option<Label>,
    #[serde(default, deserialize_with = "lenient")]
    pub assignee: Option<Assignee>,
    #[serde(default, deserialize_with = "lenient")]
    pub milestone: Option<Milestone>,
}

impl BoardList {
    /// Anything that is not a list object at all decodes to an empty list.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

fn lenient_lists<'de, D>(deserializer: D) -> Result<Vec<BoardList>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(BoardList::from_value)
        .collect())
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Board {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default, deserialize_with = "lenient_lists")]
    pub lists: Vec<BoardList>,
}

impl Board {
    pub fn milestone_title(&self) -> Option<&str> {
        self.milestone.as_ref().map(|m| m.title.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_path: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Namespace {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub path_with_namespace: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    pub namespace: Namespace,
}
