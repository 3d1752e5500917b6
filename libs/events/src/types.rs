//! Status enums shared across records.
//!
//! Each enum serializes as snake_case. `FromStr` additionally accepts the
//! display names field clients have historically sent (`"On-Mission"`,
//! `"In Progress"`), compared case-insensitively.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EventError;

/// Normalizes `"On-Mission"` / `"in progress"` / `"ON_MISSION"` to `on_mission`.
fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

// =============================================================================
// Inventory
// =============================================================================

/// Supply level of one inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    #[serde(alias = "Stable")]
    Stable,
    #[serde(alias = "Critical")]
    Critical,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Critical => "critical",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Critical)
    }
}

// =============================================================================
// Volunteers
// =============================================================================

/// Availability of a volunteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerStatus {
    #[default]
    #[serde(alias = "Available")]
    Available,
    #[serde(alias = "On-Mission")]
    OnMission,
    /// Off shift. Older clients call this `Inactive`.
    #[serde(alias = "Resting", alias = "Inactive", alias = "inactive")]
    Resting,
}

impl VolunteerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::OnMission => "on_mission",
            Self::Resting => "resting",
        }
    }
}

impl FromStr for VolunteerStatus {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "available" => Ok(Self::Available),
            "on_mission" => Ok(Self::OnMission),
            "resting" | "inactive" => Ok(Self::Resting),
            _ => Err(EventError::UnknownVariant {
                kind: "volunteer status",
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Tasks
// =============================================================================

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "In Progress")]
    InProgress,
    #[serde(alias = "Completed")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl FromStr for TaskStatus {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" | "inprogress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(EventError::UnknownVariant {
                kind: "task status",
                value: s.to_string(),
            }),
        }
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    #[serde(alias = "High")]
    High,
    #[default]
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Low")]
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(EventError::UnknownVariant {
                kind: "task priority",
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Alerts
// =============================================================================

/// Severity of an operator broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    #[default]
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl FromStr for Severity {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "critical" => Ok(Self::Critical),
            "warning" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            _ => Err(EventError::UnknownVariant {
                kind: "severity",
                value: s.to_string(),
            }),
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_display!(InventoryStatus, VolunteerStatus, TaskStatus, TaskPriority, Severity);
