use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub size: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Company row with its open-position count, as served by the directory.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CompanyListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub company: CompanyEntry,
    pub job_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyFilter {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}
