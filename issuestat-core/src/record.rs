//! Issue records as written to the CSV file

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Issue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueState {
    Open,
    Closed,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueState::Open => "OPEN",
            IssueState::Closed => "CLOSED",
        }
    }
}

/// Why an issue is in its current state
///
/// Reasons this build does not know are kept verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateReason {
    Completed,
    NotPlanned,
    Reopened,
    Duplicate,
    Unknown(String),
}

impl StateReason {
    pub fn as_str(&self) -> &str {
        match self {
            StateReason::Completed => "COMPLETED",
            StateReason::NotPlanned => "NOT_PLANNED",
            StateReason::Reopened => "REOPENED",
            StateReason::Duplicate => "DUPLICATE",
            StateReason::Unknown(raw) => raw,
        }
    }
}

impl From<String> for StateReason {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "COMPLETED" => StateReason::Completed,
            "NOT_PLANNED" => StateReason::NotPlanned,
            "REOPENED" => StateReason::Reopened,
            "DUPLICATE" => StateReason::Duplicate,
            _ => StateReason::Unknown(raw),
        }
    }
}

impl<'de> Deserialize<'de> for StateReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(StateReason::from)
    }
}

impl Serialize for StateReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One issue, reduced to the columns used for statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub state: IssueState,
    pub state_reason: Option<StateReason>,
    /// Label names in the order the API returned them
    pub labels: Vec<String>,
}

/// Shape of an issue node in the paginated query. Nullable fields must still
/// be present in the response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    number: u64,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(deserialize_with = "present_but_nullable")]
    closed_at: Option<DateTime<Utc>>,
    state: IssueState,
    #[serde(deserialize_with = "present_but_nullable")]
    state_reason: Option<StateReason>,
    labels: LabelConnection,
}

#[derive(Debug, Deserialize)]
struct LabelConnection {
    edges: Vec<LabelEdge>,
}

#[derive(Debug, Deserialize)]
struct LabelEdge {
    #[serde(default)]
    node: Option<LabelNode>,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    name: String,
}

fn present_but_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

impl IssueRecord {
    /// Decode one `node` object from an issue edge
    ///
    /// Any missing or mistyped field is an error; label edges without a
    /// `node` are skipped.
    pub fn from_node(node: &serde_json::Value) -> Result<Self, serde_json::Error> {
        let node = IssueNode::deserialize(node)?;
        Ok(Self {
            number: node.number,
            title: node.title,
            created_at: node.created_at,
            updated_at: node.updated_at,
            closed_at: node.closed_at,
            state: node.state,
            state_reason: node.state_reason,
            labels: node
                .labels
                .edges
                .into_iter()
                .filter_map(|edge| edge.node.map(|n| n.name))
                .collect(),
        })
    }

    /// Cells in header order
    pub fn to_row(&self) -> [String; 8] {
        [
            self.number.to_string(),
            self.title.clone(),
            format_timestamp(&self.created_at),
            format_timestamp(&self.updated_at),
            self.closed_at.as_ref().map(format_timestamp).unwrap_or_default(),
            self.state.as_str().to_string(),
            self.state_reason
                .as_ref()
                .map(|r| r.as_str().to_string())
                .unwrap_or_default(),
            flatten_labels(&self.labels),
        ]
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Join label names into one cell. Commas inside a name become spaces so the
/// joined list can be split again.
pub fn flatten_labels<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|l| l.as_ref().replace(',', " "))
        .collect::<Vec<_>>()
        .join(",")
}
