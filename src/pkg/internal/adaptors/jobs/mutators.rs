use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::JobEntry;
use crate::pkg::server::handlers::jobs::{CreateJobInput, PatchJobInput};
use crate::prelude::{Error, Result};

const RETURNING: &str = " RETURNING id, title, company, description, requirements, location, \
     country, visa_sponsorship, salary_min, salary_max, job_type, experience_level, \
     tech_stack, application_url, company_id, created_at, updated_at";

pub fn validate_salary_range(min: Option<i32>, max: Option<i32>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(Error::BadRequest(
                "Minimum salary cannot be greater than maximum salary".into(),
            ));
        }
    }
    Ok(())
}

/// A partial update must keep the salary order against whichever bounds
/// survive the patch, stored or incoming.
pub fn validate_salary_patch(
    patch_min: Option<i32>,
    patch_max: Option<i32>,
    stored_min: Option<i32>,
    stored_max: Option<i32>,
) -> Result<()> {
    validate_salary_range(patch_min.or(stored_min), patch_max.or(stored_max))
}

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    pub async fn create(&mut self, job: &CreateJobInput) -> Result<JobEntry> {
        validate_salary_range(job.salary_min, job.salary_max)?;
        let sql = format!(
            "INSERT INTO jobs (id, title, company, description, requirements, location, \
             country, visa_sponsorship, salary_min, salary_max, job_type, experience_level, \
             tech_stack, application_url, company_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)\
             {RETURNING}"
        );
        let row = sqlx::query_as::<_, JobEntry>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.description)
            .bind(&job.requirements)
            .bind(&job.location)
            .bind(&job.country)
            .bind(job.visa_sponsorship)
            .bind(job.salary_min)
            .bind(job.salary_max)
            .bind(job.job_type)
            .bind(job.experience_level)
            .bind(&job.tech_stack)
            .bind(&job.application_url)
            .bind(&job.company_id)
            .fetch_one(&mut *self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update(&mut self, id: &str, job: &PatchJobInput) -> Result<Option<JobEntry>> {
        if job.salary_min.is_some() || job.salary_max.is_some() {
            let stored = sqlx::query_as::<_, (Option<i32>, Option<i32>)>(
                "SELECT salary_min, salary_max FROM jobs WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&mut *self.pool)
            .await?;
            let Some((stored_min, stored_max)) = stored else {
                return Ok(None);
            };
            validate_salary_patch(job.salary_min, job.salary_max, stored_min, stored_max)?;
        }
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE jobs SET updated_at = now()");
        if let Some(title) = &job.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(company) = &job.company {
            qb.push(", company = ").push_bind(company);
        }
        if let Some(description) = &job.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(requirements) = &job.requirements {
            qb.push(", requirements = ").push_bind(requirements);
        }
        if let Some(location) = &job.location {
            qb.push(", location = ").push_bind(location);
        }
        if let Some(country) = &job.country {
            qb.push(", country = ").push_bind(country);
        }
        if let Some(visa) = job.visa_sponsorship {
            qb.push(", visa_sponsorship = ").push_bind(visa);
        }
        if let Some(min) = job.salary_min {
            qb.push(", salary_min = ").push_bind(min);
        }
        if let Some(max) = job.salary_max {
            qb.push(", salary_max = ").push_bind(max);
        }
        if let Some(job_type) = job.job_type {
            qb.push(", job_type = ").push_bind(job_type);
        }
        if let Some(level) = job.experience_level {
            qb.push(", experience_level = ").push_bind(level);
        }
        if let Some(tech_stack) = &job.tech_stack {
            qb.push(", tech_stack = ").push_bind(tech_stack);
        }
        if let Some(url) = &job.application_url {
            qb.push(", application_url = ").push_bind(url);
        }
        qb.push(" WHERE id = ").push_bind(id).push(RETURNING);
        let row = qb
            .build_query_as::<JobEntry>()
            .fetch_optional(&mut *self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_range_validation() {
        assert!(validate_salary_range(Some(80_000), Some(60_000)).is_err());
        assert!(validate_salary_range(Some(60_000), Some(80_000)).is_ok());
        assert!(validate_salary_range(Some(60_000), Some(60_000)).is_ok());
        assert!(validate_salary_range(Some(80_000), None).is_ok());
        assert!(validate_salary_range(None, Some(60_000)).is_ok());
        assert!(validate_salary_range(None, None).is_ok());
    }

    #[test]
    fn test_salary_patch_checks_stored_bounds() {
        // raising only the minimum above the stored maximum is rejected
        assert!(validate_salary_patch(Some(200_000), None, Some(60_000), Some(100_000)).is_err());
        // lowering only the maximum below the stored minimum is rejected
        assert!(validate_salary_patch(None, Some(40_000), Some(60_000), Some(100_000)).is_err());
        // a bound patched within the stored range is fine
        assert!(validate_salary_patch(Some(70_000), None, Some(60_000), Some(100_000)).is_ok());
        // patching both bounds replaces the stored ones entirely
        assert!(validate_salary_patch(Some(50_000), Some(70_000), Some(60_000), Some(100_000)).is_ok());
        // open-ended jobs accept any single bound
        assert!(validate_salary_patch(Some(200_000), None, None, None).is_ok());
    }
}
