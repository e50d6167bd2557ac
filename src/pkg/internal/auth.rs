use crate::{conf::settings, pkg::server::state::AppState, prelude::{Error, Result}};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    JobSeeker,
    Employer,
    Admin,
}

#[derive(FromRow, Serialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub role: UserRole,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(FromRow, Debug)]
pub struct Session {
    pub token: Uuid,
    pub user_id: String,
    pub expiry: DateTime<Utc>,
}

impl User {
    pub async fn create(state: &AppState, email: &str, name: &str) -> Result<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET name = $3
            RETURNING id, email, name, image, role, profile_complete, created_at
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(email)
        .bind(name)
        .fetch_one(&*state.db_pool)
        .await?;
        Ok(user)
    }

    pub async fn retrieve(state: &AppState, email: &str) -> Result<Option<Self>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, email, name, image, role, profile_complete, created_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&*state.db_pool)
        .await?)
    }

    pub async fn get_by_id(state: &AppState, id: &str) -> Result<Option<Self>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT id, email, name, image, role, profile_complete, created_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&*state.db_pool)
        .await?)
    }

    pub async fn update_role(
        &self,
        state: &AppState,
        role: UserRole,
        profile_complete: Option<bool>,
    ) -> Result<Self> {
        // Admin is granted out of band, never self-assigned.
        if role == UserRole::Admin {
            return Err(Error::BadRequest("Cannot self-assign the admin role".into()));
        }
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = $2, profile_complete = COALESCE($3, profile_complete)
            WHERE id = $1
            RETURNING id, email, name, image, role, profile_complete, created_at
            "#,
        )
        .bind(&self.id)
        .bind(role)
        .bind(profile_complete)
        .fetch_one(&*state.db_pool)
        .await?;
        Ok(user)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden("Admin access required".into()))
        }
    }
}

impl Session {
    pub async fn issue(state: &AppState, user_id: &str) -> Result<Self> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expiry)
            VALUES ($1, $2, now() + make_interval(hours => $3))
            RETURNING token, user_id, expiry
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(settings.session_ttl_hours)
        .fetch_one(&*state.db_pool)
        .await?;
        Ok(session)
    }

    pub async fn authenticate(state: &AppState, token_str: &str) -> Result<User> {
        let token = token_str
            .parse::<Uuid>()
            .map_err(|_| Error::Unauthorized("Invalid session token".into()))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.name, u.image, u.role, u.profile_complete, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expiry > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&*state.db_pool)
        .await?;
        user.ok_or_else(|| Error::Unauthorized("Session expired or unknown".into()))
    }

    pub async fn revoke(state: &AppState, token_str: &str) -> Result<()> {
        if let Ok(token) = token_str.parse::<Uuid>() {
            sqlx::query("DELETE FROM sessions WHERE token = $1")
                .bind(token)
                .execute(&*state.db_pool)
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: "u1".into(),
            email: "a@a.com".into(),
            name: "a".into(),
            image: None,
            role,
            profile_complete: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(user(UserRole::Admin).require_admin().is_ok());
        assert!(user(UserRole::JobSeeker).require_admin().is_err());
        assert!(user(UserRole::Employer).require_admin().is_err());
    }

    #[test]
    fn test_role_wire_format() {
        let role: UserRole = serde_json::from_str("\"JOB_SEEKER\"").unwrap();
        assert_eq!(role, UserRole::JobSeeker);
        assert_eq!(
            serde_json::to_string(&UserRole::Employer).unwrap(),
            "\"EMPLOYER\""
        );
    }
}
