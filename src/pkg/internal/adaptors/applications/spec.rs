use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationEntry {
    pub id: String,
    pub user_id: String,
    pub job_id: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// A job seeker's application joined with the job it targets, for the
/// "my applications" view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationWithJob {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: ApplicationEntry,
    pub job_title: String,
    pub job_location: String,
    pub company_name: String,
    pub company_logo: Option<String>,
}

/// An application joined with applicant identity, for the employer's
/// per-job review view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationWithApplicant {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub application: ApplicationEntry,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationStats {
    pub total: i64,
    pub pending: i64,
    pub reviewed: i64,
    pub rejected: i64,
}
