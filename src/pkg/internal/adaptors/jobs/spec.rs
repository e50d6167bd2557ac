use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "job_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    FullTime,
    Contract,
    Internship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "experience_level", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExperienceLevel {
    Junior,
    Mid,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostedWithin {
    Day,
    Week,
    Month,
    Any,
}

impl PostedWithin {
    /// Cutoff timestamp for the recency filter, `None` for `Any`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            PostedWithin::Day => Some(now - Duration::days(1)),
            PostedWithin::Week => Some(now - Duration::days(7)),
            PostedWithin::Month => Some(now - Duration::days(30)),
            PostedWithin::Any => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobEntry {
    pub id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub location: String,
    pub country: String,
    pub visa_sponsorship: bool,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    pub tech_stack: Vec<String>,
    pub application_url: String,
    pub company_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job row joined with its company and application count, as served by the
/// listing and detail endpoints.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub job: JobEntry,
    pub company_logo: Option<String>,
    pub company_website: Option<String>,
    pub application_count: i64,
}

/// Optional criteria narrowing the job listing. Absent fields impose no
/// constraint; present fields are combined with logical AND.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub visa_sponsorship: Option<bool>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub tech_stack: Vec<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub posted_within: Option<PostedWithin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_windows() {
        let now = Utc::now();
        assert_eq!(PostedWithin::Day.cutoff(now), Some(now - Duration::days(1)));
        assert_eq!(PostedWithin::Week.cutoff(now), Some(now - Duration::days(7)));
        assert_eq!(
            PostedWithin::Month.cutoff(now),
            Some(now - Duration::days(30))
        );
        assert_eq!(PostedWithin::Any.cutoff(now), None);
    }

    #[test]
    fn test_enum_wire_format() {
        let jt: JobType = serde_json::from_str("\"FULL_TIME\"").unwrap();
        assert_eq!(jt, JobType::FullTime);
        let lvl: ExperienceLevel = serde_json::from_str("\"SENIOR\"").unwrap();
        assert_eq!(lvl, ExperienceLevel::Senior);
        let win: PostedWithin = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(win, PostedWithin::Week);
    }
}
