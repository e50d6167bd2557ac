use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    pkg::{
        internal::auth::{Session, User},
        server::{middlewares::authn, state::AppState},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Validate)]
pub struct SignupInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<Json<SessionResponse>> {
    input.validate()?;
    let user = User::create(&state, &input.email, &input.name).await?;
    let session = Session::issue(&state, &user.id).await?;
    tracing::info!("user {} signed up", &user.email);
    Ok(Json(SessionResponse {
        token: session.token.to_string(),
        user,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<SessionResponse>> {
    input.validate()?;
    let user = User::retrieve(&state, &input.email)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
    let session = Session::issue(&state, &user.id).await?;
    Ok(Json(SessionResponse {
        token: session.token.to_string(),
        user,
    }))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>> {
    if let Some(token) = authn::bearer_token(&headers) {
        Session::revoke(&state, token).await?;
    }
    Ok(Json(json!({ "success": true })))
}
