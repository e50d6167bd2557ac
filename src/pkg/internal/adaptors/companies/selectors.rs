use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::{
    pkg::internal::{
        adaptors::{
            companies::spec::{CompanyFilter, CompanyListing},
            like_pattern,
        },
        page::{self, Page},
    },
    prelude::Result,
};

const SELECT_LISTING: &str = "SELECT c.id, c.name, c.description, c.website, c.logo, c.size, \
     c.industry, c.location, c.created_at, c.updated_at, \
     (SELECT count(*) FROM jobs j WHERE j.company_id = c.id) AS job_count \
     FROM companies c WHERE true";

pub fn apply_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &CompanyFilter) {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (c.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR c.industry ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(industry) = filter.industry.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND c.industry ILIKE ")
            .push_bind(like_pattern(industry));
    }
    if let Some(location) = filter.location.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND c.location ILIKE ")
            .push_bind(like_pattern(location));
    }
}

pub struct CompanySelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> CompanySelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        CompanySelector { pool }
    }

    /// Directory listing, alphabetical, keyset-paged on (name, id).
    pub async fn list(
        &mut self,
        filter: &CompanyFilter,
        limit: i64,
        cursor: Option<&str>,
    ) -> Result<Page<CompanyListing>> {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        apply_filters(&mut qb, filter);
        if let Some(cursor) = cursor {
            qb.push(" AND (c.name, c.id) > (SELECT name, id FROM companies WHERE id = ")
                .push_bind(cursor.to_string())
                .push(")");
        }
        qb.push(" ORDER BY c.name ASC, c.id ASC LIMIT ")
            .push_bind(limit + 1);

        let rows = qb
            .build_query_as::<CompanyListing>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(page::clamp(rows, limit as usize, |r| r.company.id.as_str()))
    }

    pub async fn get_by_id(&mut self, id: &str) -> Result<Option<CompanyListing>> {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        qb.push(" AND c.id = ").push_bind(id);
        let row = qb
            .build_query_as::<CompanyListing>()
            .fetch_optional(&mut *self.pool)
            .await?;
        Ok(row)
    }

    /// Featured companies are the ones with the most open positions.
    pub async fn get_featured(&mut self, limit: i64) -> Result<Vec<CompanyListing>> {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        qb.push(" ORDER BY job_count DESC, c.name ASC LIMIT ")
            .push_bind(limit);
        let rows = qb
            .build_query_as::<CompanyListing>()
            .fetch_all(&mut *self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn industries(&mut self) -> Result<Vec<String>> {
        let industries = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT industry FROM companies WHERE industry IS NOT NULL ORDER BY industry",
        )
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(industries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composed_sql(filter: &CompanyFilter) -> String {
        let mut qb = QueryBuilder::new(SELECT_LISTING);
        apply_filters(&mut qb, filter);
        qb.sql().to_string()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert_eq!(composed_sql(&CompanyFilter::default()), SELECT_LISTING);
    }

    #[test]
    fn test_search_spans_name_description_industry() {
        let filter = CompanyFilter {
            search: Some("fintech".into()),
            ..Default::default()
        };
        let sql = composed_sql(&filter);
        assert!(sql.contains("c.name ILIKE"));
        assert!(sql.contains("c.description ILIKE"));
        assert!(sql.contains("c.industry ILIKE"));
    }

    #[test]
    fn test_industry_and_location_are_independent_clauses() {
        let filter = CompanyFilter {
            industry: Some("software".into()),
            location: Some("remote".into()),
            ..Default::default()
        };
        let sql = composed_sql(&filter);
        assert!(sql.contains(" AND c.industry ILIKE"));
        assert!(sql.contains(" AND c.location ILIKE"));
    }
}
