use sqlx::{PgConnection, QueryBuilder};

use crate::{
    pkg::internal::{
        adaptors::contacts::spec::{ContactRequestEntry, RequestStatus},
        page::{self, Page},
    },
    prelude::Result,
};

const SELECT_ENTRY: &str = "SELECT id, company_name, contact_name, contact_email, contact_phone, \
     website, industry, company_size, location, description, visa_sponsorship_confirmed, \
     request_type, status, admin_notes, reviewed_at, created_at \
     FROM contact_requests WHERE true";

pub struct ContactRequestSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> ContactRequestSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        ContactRequestSelector { pool }
    }

    pub async fn list(
        &mut self,
        status: Option<RequestStatus>,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<Page<ContactRequestEntry>> {
        let mut qb = QueryBuilder::new(SELECT_ENTRY);
        if let Some(status) = status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(cursor) = cursor {
            qb.push(
                " AND (created_at, id) < (SELECT created_at, id FROM contact_requests WHERE id = ",
            )
            .push_bind(cursor.to_string())
            .push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit + 1);

        let rows = qb
            .build_query_as::<ContactRequestEntry>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(page::clamp(rows, limit as usize, |r| r.id.as_str()))
    }
}
