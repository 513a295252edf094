use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use mongodb::bson::oid::ObjectId;

use crate::{
    AppState,
    error::ApiError,
    model::{Employee, EmployeeInput},
};

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    Ok(ObjectId::parse_str(id)?)
}

pub async fn get_all(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = state.store.list().await?;
    Ok(Json(employees))
}

pub async fn get_one(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Employee>, ApiError> {
    let obj_id = parse_id(&id)?;
    match state.store.get(obj_id).await? {
        Some(employee) => Ok(Json(employee)),
        None => Err(ApiError::NotFound(obj_id)),
    }
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;

    let obj_id = state.store.insert(&input).await?;
    let created = state
        .store
        .get(obj_id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("inserted employee {obj_id} could not be read back")))?;

    tracing::info!(id = %created.id, "employee created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> Result<Json<Employee>, ApiError> {
    let obj_id = parse_id(&id)?;
    let Json(input) = payload?;

    if !state.store.update(obj_id, &input).await? {
        return Err(ApiError::EditTargetMissing(obj_id));
    }

    Ok(Json(input.into_employee(id)))
}

pub async fn delete(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let obj_id = parse_id(&id)?;

    if state.store.delete(obj_id).await? < 1 {
        return Err(ApiError::NotFound(obj_id));
    }

    tracing::info!(id = %obj_id, "employee deleted");
    Ok((StatusCode::OK, Json("record deleted")))
}
