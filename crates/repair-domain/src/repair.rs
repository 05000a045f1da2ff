//! Repair request and feedback domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pagination::Sort;

/// Lifecycle of a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl RepairStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepairStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

/// Urgency of a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

/// Feedback rating bounds (inclusive).
pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Clamp a submitted rating into `MIN_RATING..=MAX_RATING`.
pub fn clamp_rating(rating: i32) -> i16 {
    rating.clamp(MIN_RATING as i32, MAX_RATING as i32) as i16
}

/// Sort order for the admin repair request listing.
///
/// Wire format is a single hyphenated string (e.g. `"created-at-desc"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairSortBy {
    CreatedAt(Sort),
    UpdatedAt(Sort),
}

impl Default for RepairSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl<'de> Deserialize<'de> for RepairSortBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "created-at-desc" => Ok(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Ok(Self::CreatedAt(Sort::Asc)),
            "updated-at-desc" => Ok(Self::UpdatedAt(Sort::Desc)),
            "updated-at-asc" => Ok(Self::UpdatedAt(Sort::Asc)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &[
                    "created-at-desc",
                    "created-at-asc",
                    "updated-at-desc",
                    "updated-at-asc",
                ],
            )),
        }
    }
}
