//! Chirp data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::auth::UserId;

/// Chirp ID type
pub type ChirpId = Uuid;

/// Longest accepted chirp body, in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

/// Chirp model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: ChirpId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: UserId,
}

/// Listing order by creation time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a `sort` query parameter. Anything but `desc` sorts ascending.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    /// Sort chirps in place by creation time; ties keep their input order
    pub fn apply(self, chirps: &mut [Chirp]) {
        match self {
            SortOrder::Asc => chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Desc => chirps.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Unknown sort order: {other}")),
        }
    }
}
