use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                companies::{
                    mutators::CompanyMutator,
                    selectors::CompanySelector,
                    spec::{CompanyFilter, CompanyListing},
                },
                jobs::{selectors::JobSelector, spec::JobListing},
            },
            page,
        },
        server::{middlewares::authn::AuthUser, state::AppState},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Validate)]
pub struct ListCompaniesParams {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct CompaniesPage {
    pub companies: Vec<CompanyListing>,
    pub next_cursor: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListCompaniesParams>,
) -> Result<Json<CompaniesPage>> {
    params.validate()?;
    let filter = CompanyFilter {
        search: params.search,
        industry: params.industry,
        location: params.location,
    };
    let limit = page::effective_limit(params.limit);
    let mut conn = state.db_pool.acquire().await?;
    let page = CompanySelector::new(&mut conn)
        .list(&filter, limit, params.cursor.as_deref())
        .await?;
    Ok(Json(CompaniesPage {
        companies: page.items,
        next_cursor: page.next_cursor,
    }))
}

#[derive(Deserialize, Validate)]
pub struct FeaturedParams {
    #[validate(range(min = 1, max = 20))]
    pub limit: Option<i64>,
}

pub async fn featured(
    State(state): State<AppState>,
    Query(params): Query<FeaturedParams>,
) -> Result<Json<Vec<CompanyListing>>> {
    params.validate()?;
    let mut conn = state.db_pool.acquire().await?;
    let companies = CompanySelector::new(&mut conn)
        .get_featured(params.limit.unwrap_or(8))
        .await?;
    Ok(Json(companies))
}

pub async fn industries(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let mut conn = state.db_pool.acquire().await?;
    let industries = CompanySelector::new(&mut conn).industries().await?;
    Ok(Json(industries))
}

#[derive(Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: CompanyListing,
    pub jobs: Vec<JobListing>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompanyDetail>> {
    let mut conn = state.db_pool.acquire().await?;
    let company = CompanySelector::new(&mut conn)
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;
    let jobs = JobSelector::new(&mut conn)
        .list_for_company(&id, page::MAX_LIMIT, None)
        .await?;
    Ok(Json(CompanyDetail {
        company,
        jobs: jobs.items,
    }))
}

#[derive(Deserialize, Validate)]
pub struct CompanyJobsParams {
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct CompanyJobsPage {
    pub jobs: Vec<JobListing>,
    pub next_cursor: Option<String>,
}

pub async fn jobs(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<CompanyJobsParams>,
) -> Result<Json<CompanyJobsPage>> {
    params.validate()?;
    let limit = params.limit.unwrap_or(20).clamp(1, page::MAX_LIMIT);
    let mut conn = state.db_pool.acquire().await?;
    let page = JobSelector::new(&mut conn)
        .list_for_company(&id, limit, params.cursor.as_deref())
        .await?;
    Ok(Json(CompanyJobsPage {
        jobs: page.items,
        next_cursor: page.next_cursor,
    }))
}

#[derive(Deserialize, Validate)]
pub struct CreateCompanyInput {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub logo: Option<String>,
    pub size: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<CreateCompanyInput>,
) -> Result<Json<CompanyListing>> {
    input.validate()?;
    let mut conn = state.db_pool.acquire().await?;
    let created = CompanyMutator::new(&mut conn).create(&input).await?;
    tracing::info!("user {} listed company '{}'", &user.id, &created.name);
    let listing = CompanySelector::new(&mut conn)
        .get_by_id(&created.id)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;
    Ok(Json(listing))
}

#[derive(Deserialize, Validate)]
pub struct PatchCompanyInput {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
    #[validate(url)]
    pub logo: Option<String>,
    pub size: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<PatchCompanyInput>,
) -> Result<Json<CompanyListing>> {
    input.validate()?;
    let mut conn = state.db_pool.acquire().await?;
    CompanyMutator::new(&mut conn)
        .update(&id, &input)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;
    let listing = CompanySelector::new(&mut conn)
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Company not found".into()))?;
    Ok(Json(listing))
}
