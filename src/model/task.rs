use crate::schema::TableDefinition;
use crate::service::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Declared low to high; the table ranks `priority` in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    ToDo,
    InProgress,
    Done,
    Cancelled,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::ToDo, Status::InProgress, Status::Done, Status::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "to_do",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    /// RFC 3339, UTC; sorts chronologically as text.
    pub created_at: String,
}

/// `description` is nullable in the schema file.
fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatusChange {
    pub status: Status,
}

impl Task {
    pub fn create(input: NewTask, now: DateTime<Utc>) -> Self {
        Task {
            id: uuid::Uuid::now_v7().to_string(),
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            created_at: now.to_rfc3339(),
        }
    }

    /// `d/m/yyyy`, or the raw value when it is not a timestamp.
    pub fn created_on(&self) -> String {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|d| d.format("%-d/%-m/%Y").to_string())
            .unwrap_or_else(|_| self.created_at.clone())
    }
}

impl Record for Task {
    fn definition() -> &'static TableDefinition {
        static DEF: OnceLock<TableDefinition> = OnceLock::new();
        DEF.get_or_init(|| {
            TableDefinition::new("tasks", "id")
                .text("id")
                .text("title")
                .text("description")
                .ranked("priority", Priority::ALL.iter().map(Priority::as_str))
                .ranked("status", Status::ALL.iter().map(Status::as_str))
                .text("createdAt")
        })
    }
}
