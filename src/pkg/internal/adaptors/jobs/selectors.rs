use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::{
    pkg::internal::{
        adaptors::{
            jobs::spec::{JobFilter, JobListing},
            like_pattern,
        },
        page::{self, Page},
    },
    prelude::Result,
};

const SELECT_LISTING: &str = "SELECT j.id, j.title, j.company, j.description, j.requirements, \
     j.location, j.country, j.visa_sponsorship, j.salary_min, j.salary_max, \
     j.job_type, j.experience_level, j.tech_stack, j.application_url, \
     j.company_id, j.created_at, j.updated_at, \
     c.logo AS company_logo, c.website AS company_website, \
     (SELECT count(*) FROM applications a WHERE a.job_id = j.id) AS application_count \
     FROM jobs j JOIN companies c ON c.id = j.company_id WHERE true";

/// Append the filter conjunction to a listing query. Every present field
/// narrows the result set; an empty filter leaves the predicate matching
/// every job.
pub fn apply_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter, now: DateTime<Utc>) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (j.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.company ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(location) = filter.location.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(location);
        qb.push(" AND (j.location ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR j.country ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(visa) = filter.visa_sponsorship {
        qb.push(" AND j.visa_sponsorship = ").push_bind(visa);
    }
    if let Some(job_type) = filter.job_type {
        qb.push(" AND j.job_type = ").push_bind(job_type);
    }
    if let Some(level) = filter.experience_level {
        qb.push(" AND j.experience_level = ").push_bind(level);
    }
    if !filter.tech_stack.is_empty() {
        // Matches jobs sharing at least one tag with the requested set.
        qb.push(" AND j.tech_stack && ")
            .push_bind(filter.tech_stack.clone());
    }
    if filter.salary_min.is_some() || filter.salary_max.is_some() {
        // Range overlap: the job's [min, max] must intersect the requested
        // range, with absent bounds unbounded. Jobs without any salary
        // information never match a salary-constrained query.
        qb.push(" AND (j.salary_min IS NOT NULL OR j.salary_max IS NOT NULL)");
        if let Some(max) = filter.salary_max {
            qb.push(" AND (j.salary_min IS NULL OR j.salary_min <= ")
                .push_bind(max)
                .push(")");
        }
        if let Some(min) = filter.salary_min {
            qb.push(" AND (j.salary_max IS NULL OR j.salary_max >= ")
                .push_bind(min)
                .push(")");
        }
    }
    if let Some(cutoff) = filter.posted_within.and_then(|w| w.cutoff(now)) {
        qb.push(" AND j.created_at >= ").push_bind(cutoff);
    }
}

pub struct JobSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobSelector { pool }
    }

    pub async fn list(
        &mut self,
        filter: &JobFilter,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<Page<JobListing>> {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        apply_filters(&mut qb, filter, Utc::now());
        if let Some(cursor) = cursor {
            qb.push(" AND (j.created_at, j.id) < (SELECT created_at, id FROM jobs WHERE id = ")
                .push_bind(cursor.to_string())
                .push(")");
        }
        qb.push(" ORDER BY j.created_at DESC, j.id DESC LIMIT ")
            .push_bind(limit + 1);

        let rows = qb
            .build_query_as::<JobListing>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(page::clamp(rows, limit as usize, |r| r.job.id.as_str()))
    }

    pub async fn list_for_company(
        &mut self,
        company_id: &str,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<Page<JobListing>> {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        qb.push(" AND j.company_id = ").push_bind(company_id);
        if let Some(cursor) = cursor {
            qb.push(" AND (j.created_at, j.id) < (SELECT created_at, id FROM jobs WHERE id = ")
                .push_bind(cursor.to_string())
                .push(")");
        }
        qb.push(" ORDER BY j.created_at DESC, j.id DESC LIMIT ")
            .push_bind(limit + 1);

        let rows = qb
            .build_query_as::<JobListing>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(page::clamp(rows, limit as usize, |r| r.job.id.as_str()))
    }

    pub async fn get_by_id(&mut self, id: &str) -> Result<Option<JobListing>> {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        qb.push(" AND j.id = ").push_bind(id);
        let row = qb
            .build_query_as::<JobListing>()
            .fetch_optional(&mut *self.pool)
            .await?;
        Ok(row)
    }

    /// Jobs by id, returned in the order the ids were given.
    pub async fn get_by_ids(&mut self, ids: &[String]) -> Result<Vec<JobListing>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        qb.push(" AND j.id = ANY(")
            .push_bind(ids.to_vec())
            .push(") ORDER BY array_position(")
            .push_bind(ids.to_vec())
            .push(", j.id)");
        let rows = qb
            .build_query_as::<JobListing>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(rows)
    }

    /// Featured jobs are the latest visa-sponsored listings.
    pub async fn get_featured(&mut self, limit: i64) -> Result<Vec<JobListing>> {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        qb.push(" AND j.visa_sponsorship = true ORDER BY j.created_at DESC, j.id DESC LIMIT ")
            .push_bind(limit);
        let rows = qb
            .build_query_as::<JobListing>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn tech_stacks(&mut self) -> Result<Vec<String>> {
        let tags = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT unnest(tech_stack) AS tag FROM jobs ORDER BY tag",
        )
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(tags)
    }

    pub async fn locations(&mut self) -> Result<Vec<String>> {
        let locations = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT loc FROM \
             (SELECT location AS loc FROM jobs UNION SELECT country FROM jobs) t \
             WHERE loc <> '' ORDER BY loc",
        )
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::internal::adaptors::jobs::spec::{ExperienceLevel, JobType, PostedWithin};

    fn composed_sql(filter: &JobFilter) -> String {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        apply_filters(&mut qb, filter, Utc::now());
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let sql = composed_sql(&JobFilter::default());
        assert_eq!(sql, SELECT_LISTING);
    }

    #[test]
    fn test_search_spans_title_company_description() {
        let filter = JobFilter {
            search: Some("rust".into()),
            ..Default::default()
        };
        let sql = composed_sql(&filter);
        assert!(sql.contains("j.title ILIKE"));
        assert!(sql.contains("j.company ILIKE"));
        assert!(sql.contains("j.description ILIKE"));
    }

    #[test]
    fn test_location_spans_location_and_country() {
        let filter = JobFilter {
            location: Some("berlin".into()),
            ..Default::default()
        };
        let sql = composed_sql(&filter);
        assert!(sql.contains("j.location ILIKE"));
        assert!(sql.contains("j.country ILIKE"));
    }

    #[test]
    fn test_blank_text_fields_impose_no_constraint() {
        let filter = JobFilter {
            search: Some("".into()),
            location: Some("".into()),
            ..Default::default()
        };
        assert_eq!(composed_sql(&filter), SELECT_LISTING);
    }

    #[test]
    fn test_tech_stack_uses_array_overlap() {
        let filter = JobFilter {
            tech_stack: vec!["rust".into(), "go".into()],
            ..Default::default()
        };
        assert!(composed_sql(&filter).contains("j.tech_stack &&"));
    }

    #[test]
    fn test_salary_overlap_with_both_bounds() {
        let filter = JobFilter {
            salary_min: Some(80_000),
            salary_max: Some(120_000),
            ..Default::default()
        };
        let sql = composed_sql(&filter);
        assert!(sql.contains("j.salary_min IS NOT NULL OR j.salary_max IS NOT NULL"));
        assert!(sql.contains("j.salary_min IS NULL OR j.salary_min <="));
        assert!(sql.contains("j.salary_max IS NULL OR j.salary_max >="));
    }

    #[test]
    fn test_salary_min_only_leaves_upper_bound_open() {
        // salary_min=80000 with no max: only the lower-bound clause is
        // emitted, so a job paying 60000..=90000 still overlaps.
        let filter = JobFilter {
            salary_min: Some(80_000),
            ..Default::default()
        };
        let sql = composed_sql(&filter);
        assert!(sql.contains("j.salary_max IS NULL OR j.salary_max >="));
        assert!(!sql.contains("j.salary_min IS NULL OR j.salary_min <="));
    }

    #[test]
    fn test_posted_within_any_imposes_no_constraint() {
        let filter = JobFilter {
            posted_within: Some(PostedWithin::Any),
            ..Default::default()
        };
        assert_eq!(composed_sql(&filter), SELECT_LISTING);
    }

    #[test]
    fn test_full_filter_is_a_conjunction() {
        let filter = JobFilter {
            search: Some("engineer".into()),
            location: Some("Berlin".into()),
            visa_sponsorship: Some(true),
            job_type: Some(JobType::FullTime),
            experience_level: Some(ExperienceLevel::Senior),
            tech_stack: vec!["rust".into()],
            salary_min: Some(50_000),
            salary_max: Some(90_000),
            posted_within: Some(PostedWithin::Week),
        };
        let sql = composed_sql(&filter);
        assert!(sql.contains("j.visa_sponsorship ="));
        assert!(sql.contains("j.job_type ="));
        assert!(sql.contains("j.experience_level ="));
        assert!(sql.contains("j.created_at >="));
        assert!(!sql.contains(" OR j.visa_sponsorship"));
    }
}
