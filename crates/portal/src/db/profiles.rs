//! Profile repository backed by `campus.profile`.

use async_trait::async_trait;
use sqlx::PgPool;

use campus_core::{PrincipalId, Profile, Role};

use super::RepositoryError;
use crate::services::profiles::ProfileStore;

/// Columns selected by every query, in [`ProfileRow`] order.
const PROFILE_COLUMNS: &str = "principal_id, onboarding_completed, first_name, last_name, role";

#[derive(sqlx::FromRow)]
struct ProfileRow {
    principal_id: PrincipalId,
    onboarding_completed: bool,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Role,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            principal_id: row.principal_id,
            onboarding_completed: row.onboarding_completed,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
        }
    }
}

/// Repository for profile database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn fetch(&self, principal: PrincipalId) -> Result<Option<Profile>, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            "SELECT {PROFILE_COLUMNS} FROM campus.profile WHERE principal_id = $1"
        ))
        .bind(principal)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn ensure(&self, principal: PrincipalId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO campus.profile (principal_id)
            VALUES ($1)
            ON CONFLICT (principal_id) DO NOTHING
            ",
        )
        .bind(principal)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn complete_onboarding(
        &self,
        principal: PrincipalId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Profile, RepositoryError> {
        let row: ProfileRow = sqlx::query_as(&format!(
            r"
            INSERT INTO campus.profile (principal_id, first_name, last_name, onboarding_completed)
            VALUES ($1, $2, $3, TRUE)
            ON CONFLICT (principal_id) DO UPDATE
            SET first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                onboarding_completed = TRUE,
                updated_at = now()
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(principal)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn set_role(&self, principal: PrincipalId, role: Role) -> Result<Profile, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(&format!(
            r"
            UPDATE campus.profile
            SET role = $2, updated_at = now()
            WHERE principal_id = $1
            RETURNING {PROFILE_COLUMNS}
            "
        ))
        .bind(principal)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Profile::from).ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
