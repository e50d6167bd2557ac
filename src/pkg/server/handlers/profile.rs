use axum::{Json, extract::State};
use serde::Deserialize;

use crate::{
    pkg::{
        internal::auth::{User, UserRole},
        server::{middlewares::authn::AuthUser, state::AppState},
    },
    prelude::{Error, Result},
};

pub async fn get(State(state): State<AppState>, AuthUser(user): AuthUser) -> Result<Json<User>> {
    let user = User::get_by_id(&state, &user.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct UpdateRoleInput {
    pub role: UserRole,
    pub profile_complete: Option<bool>,
}

pub async fn update_role(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(input): Json<UpdateRoleInput>,
) -> Result<Json<User>> {
    let updated = user
        .update_role(&state, input.role, input.profile_complete)
        .await?;
    tracing::info!("user {} set role {:?}", &updated.id, &updated.role);
    Ok(Json(updated))
}
