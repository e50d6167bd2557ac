use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pkg::internal::adaptors::companies::spec::CompanyEntry;
use crate::pkg::server::handlers::companies::{CreateCompanyInput, PatchCompanyInput};
use crate::prelude::Result;

const RETURNING: &str = " RETURNING id, name, description, website, logo, size, industry, \
     location, created_at, updated_at";

pub struct CompanyMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> CompanyMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        CompanyMutator { pool }
    }

    pub async fn create(&mut self, company: &CreateCompanyInput) -> Result<CompanyEntry> {
        let sql = format!(
            "INSERT INTO companies (id, name, description, website, logo, size, industry, location) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8){RETURNING}"
        );
        let row = sqlx::query_as::<_, CompanyEntry>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&company.name)
            .bind(&company.description)
            .bind(&company.website)
            .bind(&company.logo)
            .bind(&company.size)
            .bind(&company.industry)
            .bind(&company.location)
            .fetch_one(&mut *self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update(
        &mut self,
        id: &str,
        company: &PatchCompanyInput,
    ) -> Result<Option<CompanyEntry>> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE companies SET updated_at = now()");
        if let Some(name) = &company.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &company.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(website) = &company.website {
            qb.push(", website = ").push_bind(website);
        }
        if let Some(logo) = &company.logo {
            qb.push(", logo = ").push_bind(logo);
        }
        if let Some(size) = &company.size {
            qb.push(", size = ").push_bind(size);
        }
        if let Some(industry) = &company.industry {
            qb.push(", industry = ").push_bind(industry);
        }
        if let Some(location) = &company.location {
            qb.push(", location = ").push_bind(location);
        }
        qb.push(" WHERE id = ").push_bind(id).push(RETURNING);
        let row = qb
            .build_query_as::<CompanyEntry>()
            .fetch_optional(&mut *self.pool)
            .await?;
        Ok(row)
    }
}
