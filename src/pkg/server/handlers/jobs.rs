use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    pkg::{
        internal::{
            adaptors::{
                applications::{
                    selectors::ApplicationSelector,
                    spec::{ApplicationStatus, ApplicationWithApplicant},
                },
                jobs::{
                    mutators::JobMutator,
                    selectors::JobSelector,
                    spec::{ExperienceLevel, JobFilter, JobListing, JobType, PostedWithin},
                },
            },
            page,
        },
        server::{handlers::csv_list, middlewares::authn::AuthUser, state::AppState},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Validate)]
pub struct ListJobsParams {
    pub search: Option<String>,
    pub location: Option<String>,
    pub visa_sponsorship: Option<bool>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    /// Comma-separated tags; a job matches if it carries any of them.
    pub tech_stack: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub posted_within: Option<PostedWithin>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct JobsPage {
    pub jobs: Vec<JobListing>,
    pub next_cursor: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListJobsParams>,
) -> Result<Json<JobsPage>> {
    params.validate()?;
    let filter = JobFilter {
        search: params.search,
        location: params.location,
        visa_sponsorship: params.visa_sponsorship,
        job_type: params.job_type,
        experience_level: params.experience_level,
        tech_stack: csv_list(params.tech_stack.as_deref()),
        salary_min: params.salary_min,
        salary_max: params.salary_max,
        posted_within: params.posted_within,
    };
    let limit = page::effective_limit(params.limit);
    let mut conn = state.db_pool.acquire().await?;
    let page = JobSelector::new(&mut conn)
        .list(&filter, limit, params.cursor.as_deref())
        .await?;
    Ok(Json(JobsPage {
        jobs: page.items,
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
) -> Result<Json<Vec<JobListing>>> {
    params.validate()?;
    let mut conn = state.db_pool.acquire().await?;
    let jobs = JobSelector::new(&mut conn)
        .get_featured(params.limit.unwrap_or(6))
        .await?;
    Ok(Json(jobs))
}

pub async fn tech_stacks(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let mut conn = state.db_pool.acquire().await?;
    let tags = JobSelector::new(&mut conn).tech_stacks().await?;
    Ok(Json(tags))
}

pub async fn locations(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let mut conn = state.db_pool.acquire().await?;
    let locations = JobSelector::new(&mut conn).locations().await?;
    Ok(Json(locations))
}

#[derive(Deserialize)]
pub struct BatchParams {
    /// Comma-separated job ids; results come back in the given order.
    pub ids: Option<String>,
}

pub async fn batch(
    State(state): State<AppState>,
    Query(params): Query<BatchParams>,
) -> Result<Json<Vec<JobListing>>> {
    let ids = csv_list(params.ids.as_deref());
    let mut conn = state.db_pool.acquire().await?;
    let jobs = JobSelector::new(&mut conn).get_by_ids(&ids).await?;
    Ok(Json(jobs))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobListing>> {
    let mut conn = state.db_pool.acquire().await?;
    let job = JobSelector::new(&mut conn)
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
    Ok(Json(job))
}

#[derive(Deserialize, Validate)]
pub struct CreateJobInput {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[validate(length(min = 1))]
    pub location: String,
    #[validate(length(min = 1))]
    pub country: String,
    #[serde(default)]
    pub visa_sponsorship: bool,
    #[validate(range(min = 1))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 1))]
    pub salary_max: Option<i32>,
    pub job_type: JobType,
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[validate(url)]
    pub application_url: String,
    #[validate(length(min = 1))]
    pub company_id: String,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<CreateJobInput>,
) -> Result<Json<JobListing>> {
    input.validate()?;
    let mut conn = state.db_pool.acquire().await?;
    let created = JobMutator::new(&mut conn).create(&input).await?;
    tracing::info!("user {} posted job '{}'", &user.id, &created.title);
    let listing = JobSelector::new(&mut conn)
        .get_by_id(&created.id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
    Ok(Json(listing))
}

#[derive(Deserialize, Validate)]
pub struct PatchJobInput {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub company: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    #[validate(length(min = 1))]
    pub location: Option<String>,
    #[validate(length(min = 1))]
    pub country: Option<String>,
    pub visa_sponsorship: Option<bool>,
    #[validate(range(min = 1))]
    pub salary_min: Option<i32>,
    #[validate(range(min = 1))]
    pub salary_max: Option<i32>,
    pub job_type: Option<JobType>,
    pub experience_level: Option<ExperienceLevel>,
    pub tech_stack: Option<Vec<String>>,
    #[validate(url)]
    pub application_url: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<PatchJobInput>,
) -> Result<Json<JobListing>> {
    input.validate()?;
    let mut conn = state.db_pool.acquire().await?;
    JobMutator::new(&mut conn)
        .update(&id, &input)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
    let listing = JobSelector::new(&mut conn)
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Job not found".into()))?;
    Ok(Json(listing))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let mut conn = state.db_pool.acquire().await?;
    let deleted = JobMutator::new(&mut conn).delete(&id).await?;
    if !deleted {
        return Err(Error::NotFound("Job not found".into()));
    }
    tracing::info!("user {} deleted job {}", &user.id, &id);
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize, Validate)]
pub struct JobApplicationsParams {
    pub status: Option<ApplicationStatus>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct JobApplicationsPage {
    pub applications: Vec<ApplicationWithApplicant>,
    pub next_cursor: Option<String>,
}

pub async fn applications(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Query(params): Query<JobApplicationsParams>,
) -> Result<Json<JobApplicationsPage>> {
    params.validate()?;
    let limit = page::effective_limit(params.limit);
    let mut conn = state.db_pool.acquire().await?;
    let page = ApplicationSelector::new(&mut conn)
        .list_for_job(&id, params.status, limit, params.cursor.as_deref())
        .await?;
    Ok(Json(JobApplicationsPage {
        applications: page.items,
        next_cursor: page.next_cursor,
    }))
}
