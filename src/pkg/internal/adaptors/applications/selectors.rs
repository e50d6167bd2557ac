use sqlx::{PgConnection, QueryBuilder};

use crate::{
    pkg::internal::{
        adaptors::applications::spec::{
            ApplicationStats, ApplicationStatus, ApplicationWithApplicant, ApplicationWithJob,
        },
        page::{self, Page},
    },
    prelude::Result,
};

const SELECT_WITH_JOB: &str = "SELECT a.id, a.user_id, a.job_id, a.status, a.applied_at, \
     j.title AS job_title, j.location AS job_location, \
     c.name AS company_name, c.logo AS company_logo \
     FROM applications a \
     JOIN jobs j ON j.id = a.job_id \
     JOIN companies c ON c.id = j.company_id WHERE true";

const SELECT_WITH_APPLICANT: &str = "SELECT a.id, a.user_id, a.job_id, a.status, a.applied_at, \
     u.name AS applicant_name, u.email AS applicant_email, u.image AS applicant_image \
     FROM applications a \
     JOIN users u ON u.id = a.user_id WHERE true";

pub struct ApplicationSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ApplicationSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ApplicationSelector { pool }
    }

    pub async fn list_for_user(
        &mut self,
        user_id: &str,
        status: Option<ApplicationStatus>,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<Page<ApplicationWithJob>> {
        let mut qb = QueryBuilder::new(SELECT_WITH_JOB);
        qb.push(" AND a.user_id = ").push_bind(user_id);
        if let Some(status) = status {
            qb.push(" AND a.status = ").push_bind(status);
        }
        if let Some(cursor) = cursor {
            qb.push(" AND (a.applied_at, a.id) < (SELECT applied_at, id FROM applications WHERE id = ")
                .push_bind(cursor.to_string())
                .push(")");
        }
        qb.push(" ORDER BY a.applied_at DESC, a.id DESC LIMIT ")
            .push_bind(limit + 1);

        let rows = qb
            .build_query_as::<ApplicationWithJob>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(page::clamp(rows, limit as usize, |r| r.application.id.as_str()))
    }

    pub async fn list_for_job(
        &mut self,
        job_id: &str,
        status: Option<ApplicationStatus>,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<Page<ApplicationWithApplicant>> {
        let mut qb = QueryBuilder::new(SELECT_WITH_APPLICANT);
        qb.push(" AND a.job_id = ").push_bind(job_id);
        if let Some(status) = status {
            qb.push(" AND a.status = ").push_bind(status);
        }
        if let Some(cursor) = cursor {
            qb.push(" AND (a.applied_at, a.id) < (SELECT applied_at, id FROM applications WHERE id = ")
                .push_bind(cursor.to_string())
                .push(")");
        }
        qb.push(" ORDER BY a.applied_at DESC, a.id DESC LIMIT ")
            .push_bind(limit + 1);

        let rows = qb
            .build_query_as::<ApplicationWithApplicant>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(page::clamp(rows, limit as usize, |r| r.application.id.as_str()))
    }

    pub async fn get_by_id(&mut self, id: &str) -> Result<Option<ApplicationWithJob>> {
        let mut qb = QueryBuilder::new(SELECT_WITH_JOB);
        qb.push(" AND a.id = ").push_bind(id);
        let row = qb
            .build_query_as::<ApplicationWithJob>()
            .fetch_optional(&mut *self.pool)
            .await?;
        Ok(row)
    }

    pub async fn stats_for_user(&mut self, user_id: &str) -> Result<ApplicationStats> {
        let stats = sqlx::query_as::<_, ApplicationStats>(
            "SELECT count(*) AS total, \
             count(*) FILTER (WHERE status = 'pending') AS pending, \
             count(*) FILTER (WHERE status = 'reviewed') AS reviewed, \
             count(*) FILTER (WHERE status = 'rejected') AS rejected \
             FROM applications WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(stats)
    }
}
