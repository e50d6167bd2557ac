use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::{
    pkg::{
        internal::{
            adaptors::contacts::{
                mutators::ContactRequestMutator,
                selectors::ContactRequestSelector,
                spec::{ContactRequestEntry, RequestStatus, RequestType},
            },
            page,
        },
        server::{middlewares::authn::AuthUser, state::{AppState, GetTxn}},
    },
    prelude::{Error, Result},
};

#[derive(Deserialize, Validate)]
pub struct ContactRequestInput {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "Contact name is required"))]
    pub contact_name: String,
    #[validate(email(message = "Valid email is required"))]
    pub contact_email: String,
    pub contact_phone: Option<String>,
    #[validate(custom(function = validate_website, message = "Website must be a valid URL"))]
    pub website: Option<String>,
    #[validate(length(min = 1, message = "Industry is required"))]
    pub industry: String,
    #[validate(length(min = 1, message = "Company size is required"))]
    pub company_size: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    pub visa_sponsorship_confirmed: bool,
    pub request_type: RequestType,
}

// Valid URL or empty string; empty is stored as NULL downstream.
fn validate_website(website: &str) -> std::result::Result<(), ValidationError> {
    if website.is_empty() || website.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub id: String,
    pub message: String,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(input): Json<ContactRequestInput>,
) -> Result<Json<SubmitResponse>> {
    input.validate()?;
    if !input.visa_sponsorship_confirmed {
        return Err(Error::BadRequest(
            "Visa sponsorship confirmation is required".into(),
        ));
    }
    let mut conn = state.db_pool.acquire().await?;
    let request = ContactRequestMutator::new(&mut conn).submit(&input).await?;
    tracing::info!(
        "contact request {} submitted for '{}'",
        &request.id,
        &request.company_name
    );
    Ok(Json(SubmitResponse {
        success: true,
        id: request.id,
        message: "Your request has been submitted successfully".into(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct ListRequestsParams {
    pub status: Option<RequestStatus>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct RequestsPage {
    pub items: Vec<ContactRequestEntry>,
    pub next_cursor: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ListRequestsParams>,
) -> Result<Json<RequestsPage>> {
    user.require_admin()?;
    params.validate()?;
    let limit = page::effective_limit(params.limit);
    let mut conn = state.db_pool.acquire().await?;
    let page = ContactRequestSelector::new(&mut conn)
        .list(params.status, limit, params.cursor.as_deref())
        .await?;
    Ok(Json(RequestsPage {
        items: page.items,
        next_cursor: page.next_cursor,
    }))
}

#[derive(Deserialize)]
pub struct ReviewInput {
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
}

pub async fn review(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<ContactRequestEntry>> {
    user.require_admin()?;
    let mut tx = state.db_pool.begin_txn().await?;
    let updated = ContactRequestMutator::new(&mut tx)
        .review(&id, input.status, input.admin_notes.as_deref())
        .await?;
    tx.commit().await?;
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_website_accepts_url_or_empty() {
        assert!(validate_website("https://acme.example").is_ok());
        assert!(validate_website("").is_ok());
        assert!(validate_website("not a url").is_err());
    }
}
