/*
 * Responsibility
 * - /{resource} and /{resource}/{id} for the calendar entities
 * - Entity mapping and persistence belong to the CRUD layer; these handlers
 *   only acknowledge what was requested and by whom, so the routing and the
 *   auth pipeline in front of them can be exercised end to end
 */
use axum::{
    Json,
    extract::Path,
    http::StatusCode,
};
use serde::Serialize;

use crate::{api::extractors::Security, error::AppError};

pub const RESOURCES: &[&str] = &[
    "consultation",
    "content",
    "contenttype",
    "event",
    "globalsettings",
    "powerpoint",
    "role",
    "rssfeed",
    "schedule",
    "user",
    "useravailability",
];

#[derive(Debug, Serialize)]
pub struct ResourceAck {
    pub resource: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub action: &'static str,
    pub requested_by: Option<String>,
}

fn resolve(resource: &str) -> Result<&'static str, AppError> {
    RESOURCES
        .iter()
        .copied()
        .find(|r| *r == resource)
        .ok_or(AppError::not_found("resource"))
}

fn ack(
    resource: &str,
    id: Option<String>,
    action: &'static str,
    Security(ctx): Security,
) -> Result<Json<ResourceAck>, AppError> {
    Ok(Json(ResourceAck {
        resource: resolve(resource)?,
        id,
        action,
        requested_by: ctx.into_principal().map(|p| p.username),
    }))
}

pub async fn list(
    Path(resource): Path<String>,
    security: Security,
) -> Result<Json<ResourceAck>, AppError> {
    ack(&resource, None, "list", security)
}

pub async fn create(
    Path(resource): Path<String>,
    security: Security,
) -> Result<(StatusCode, Json<ResourceAck>), AppError> {
    Ok((StatusCode::CREATED, ack(&resource, None, "create", security)?))
}

pub async fn get(
    Path((resource, id)): Path<(String, String)>,
    security: Security,
) -> Result<Json<ResourceAck>, AppError> {
    ack(&resource, Some(id), "get", security)
}

pub async fn update(
    Path((resource, id)): Path<(String, String)>,
    security: Security,
) -> Result<Json<ResourceAck>, AppError> {
    ack(&resource, Some(id), "update", security)
}

pub async fn delete(
    Path((resource, id)): Path<(String, String)>,
    security: Security,
) -> Result<Json<ResourceAck>, AppError> {
    ack(&resource, Some(id), "delete", security)
}
