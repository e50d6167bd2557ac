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
            adaptors::applications::{
                mutators::ApplicationMutator,
                selectors::ApplicationSelector,
                spec::{ApplicationEntry, ApplicationStats, ApplicationStatus, ApplicationWithJob},
            },
            page,
        },
        server::{middlewares::authn::AuthUser, state::AppState},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Validate)]
pub struct ApplyInput {
    #[validate(length(min = 1))]
    pub job_id: String,
}

pub async fn apply(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<ApplyInput>,
) -> Result<Json<ApplicationEntry>> {
    input.validate()?;
    let mut conn = state.db_pool.acquire().await?;
    let application = ApplicationMutator::new(&mut conn)
        .apply(&user.id, &input.job_id)
        .await?;
    tracing::info!("user {} applied to job {}", &user.id, &input.job_id);
    Ok(Json(application))
}

#[derive(Deserialize, Validate)]
pub struct ListApplicationsParams {
    pub status: Option<ApplicationStatus>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct ApplicationsPage {
    pub applications: Vec<ApplicationWithJob>,
    pub next_cursor: Option<String>,
}

/// The caller's own applications, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListApplicationsParams>,
) -> Result<Json<ApplicationsPage>> {
    params.validate()?;
    let limit = page::effective_limit(params.limit);
    let mut conn = state.db_pool.acquire().await?;
    let page = ApplicationSelector::new(&mut conn)
        .list_for_user(&user.id, params.status, limit, params.cursor.as_deref())
        .await?;
    Ok(Json(ApplicationsPage {
        applications: page.items,
        next_cursor: page.next_cursor,
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApplicationStats>> {
    let mut conn = state.db_pool.acquire().await?;
    let stats = ApplicationSelector::new(&mut conn)
        .stats_for_user(&user.id)
        .await?;
    Ok(Json(stats))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApplicationWithJob>> {
    let mut conn = state.db_pool.acquire().await?;
    let application = ApplicationSelector::new(&mut conn)
        .get_by_id(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".into()))?;
    if application.application.user_id != user.id && !user.is_admin() {
        return Err(Error::Forbidden("Not your application".into()));
    }
    Ok(Json(application))
}

#[derive(Deserialize)]
pub struct UpdateStatusInput {
    pub status: ApplicationStatus,
}

pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<UpdateStatusInput>,
) -> Result<Json<ApplicationEntry>> {
    let mut conn = state.db_pool.acquire().await?;
    let application = ApplicationMutator::new(&mut conn)
        .update_status(&id, input.status)
        .await?;
    Ok(Json(application))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let mut conn = state.db_pool.acquire().await?;
    ApplicationMutator::new(&mut conn)
        .delete(&id, &user.id)
        .await?;
    Ok(Json(json!({ "success": true })))
}
