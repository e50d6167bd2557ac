use sqlx::PgConnection;
use uuid::Uuid;

use crate::pkg::internal::adaptors::contacts::spec::{ContactRequestEntry, RequestStatus};
use crate::pkg::server::handlers::contact::ContactRequestInput;
use crate::prelude::{Error, Result};

const RETURNING: &str = " RETURNING id, company_name, contact_name, contact_email, contact_phone, \
     website, industry, company_size, location, description, visa_sponsorship_confirmed, \
     request_type, status, admin_notes, reviewed_at, created_at";

/// A review creates a company only on the transition into approved, so
/// re-approving a request never lists it twice.
fn creates_company(old: RequestStatus, new: RequestStatus) -> bool {
    new == RequestStatus::Approved && old != RequestStatus::Approved
}

pub struct ContactRequestMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ContactRequestMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ContactRequestMutator { pool }
    }

    pub async fn submit(&mut self, input: &ContactRequestInput) -> Result<ContactRequestEntry> {
        let sql = format!(
            "INSERT INTO contact_requests (id, company_name, contact_name, contact_email, \
             contact_phone, website, industry, company_size, location, description, \
             visa_sponsorship_confirmed, request_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12){RETURNING}"
        );
        let row = sqlx::query_as::<_, ContactRequestEntry>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&input.company_name)
            .bind(&input.contact_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(input.website.as_deref().filter(|w| !w.is_empty()))
            .bind(&input.industry)
            .bind(&input.company_size)
            .bind(&input.location)
            .bind(&input.description)
            .bind(input.visa_sponsorship_confirmed)
            .bind(input.request_type)
            .fetch_one(&mut *self.pool)
            .await?;
        Ok(row)
    }

    /// Admin review. Setting the status to approved copies the request into
    /// a new company record; a request that is already approved is never
    /// copied twice. Run inside a transaction so the status change and the
    /// company creation land together.
    pub async fn review(
        &mut self,
        id: &str,
        status: RequestStatus,
        admin_notes: Option<&str>,
    ) -> Result<ContactRequestEntry> {
        let existing = sqlx::query_as::<_, ContactRequestEntry>(
            "SELECT id, company_name, contact_name, contact_email, contact_phone, website, \
             industry, company_size, location, description, visa_sponsorship_confirmed, \
             request_type, status, admin_notes, reviewed_at, created_at \
             FROM contact_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Contact request not found".into()))?;

        let sql = format!(
            "UPDATE contact_requests \
             SET status = $2, admin_notes = COALESCE($3, admin_notes), reviewed_at = now() \
             WHERE id = $1{RETURNING}"
        );
        let updated = sqlx::query_as::<_, ContactRequestEntry>(&sql)
            .bind(id)
            .bind(status)
            .bind(admin_notes)
            .fetch_one(&mut *self.pool)
            .await?;

        if creates_company(existing.status, status) {
            sqlx::query(
                "INSERT INTO companies (id, name, description, website, size, industry, location) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&updated.company_name)
            .bind(&updated.description)
            .bind(&updated.website)
            .bind(&updated.company_size)
            .bind(&updated.industry)
            .bind(&updated.location)
            .execute(&mut *self.pool)
            .await?;
            tracing::info!(
                "approved contact request {}, company '{}' listed",
                &updated.id,
                &updated.company_name
            );
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_created_only_on_transition_into_approved() {
        assert!(creates_company(RequestStatus::Pending, RequestStatus::Approved));
        assert!(creates_company(RequestStatus::Rejected, RequestStatus::Approved));
        assert!(!creates_company(RequestStatus::Approved, RequestStatus::Approved));
        assert!(!creates_company(RequestStatus::Pending, RequestStatus::Rejected));
        assert!(!creates_company(RequestStatus::Approved, RequestStatus::Rejected));
    }
}
