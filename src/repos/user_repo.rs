/*
 * Responsibility
 * - Credential lookups against the existing "user" table (schema owned elsewhere)
 * - Only the columns login/signup need: id, name, password, role, enabled
 */
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, FromRow)]
pub struct CredentialRow {
    pub id: i32,
    pub name: String,
    pub password: String,
    pub role: Option<String>,
    pub enabled: bool,
}

pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<CredentialRow>, RepoError> {
    let row = sqlx::query_as::<_, CredentialRow>(
        r#"
        SELECT id, name, password, role, enabled
        FROM "user"
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<CredentialRow, RepoError> {
    let row = sqlx::query_as::<_, CredentialRow>(
        r#"
        INSERT INTO "user" (name, email, password, role, enabled, "profileImagePath", "isApproved")
        VALUES ($1, $2, $3, $4, TRUE, '', FALSE)
        RETURNING id, name, password, role, enabled
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    Ok(row)
}
