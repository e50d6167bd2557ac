use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::applications::spec::{ApplicationEntry, ApplicationStatus};
use crate::prelude::{Error, Result};

const RETURNING: &str = " RETURNING id, user_id, job_id, status, applied_at";

pub struct ApplicationMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationMutator { pool }
    }

    pub async fn apply(&mut self, user_id: &str, job_id: &str) -> Result<ApplicationEntry> {
        let job_exists = sqlx::query_scalar::<_, bool>("SELECT exists(SELECT 1 FROM jobs WHERE id = $1)")
            .bind(job_id)
            .fetch_one(&mut *self.pool)
            .await?;
        if !job_exists {
            return Err(Error::NotFound("Job not found".into()));
        }

        let sql = format!(
            "INSERT INTO applications (id, user_id, job_id) VALUES ($1, $2, $3){RETURNING}"
        );
        let result = sqlx::query_as::<_, ApplicationEntry>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(job_id)
            .fetch_one(&mut *self.pool)
            .await;
        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Conflict(
                "You have already applied to this job".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_status(
        &mut self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<ApplicationEntry> {
        let sql = format!("UPDATE applications SET status = $2 WHERE id = $1{RETURNING}");
        let row = sqlx::query_as::<_, ApplicationEntry>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&mut *self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))?;
        Ok(row)
    }

    /// Withdraw an application. Only the applicant may delete their own
    /// record; anyone else gets the same answer as a missing row.
    pub async fn delete(&mut self, id: &str, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(
                "Application not found or unauthorized".into(),
            ));
        }
        Ok(())
    }
}
