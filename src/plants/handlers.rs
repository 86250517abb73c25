use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, error::ApiError, extract::Json, state::AppState};

use super::{
    dto::{
        CreatePlantRequest, CreatedPlantResponse, DeletedResponse, PlantListResponse,
        PlantResponse, UpdatePlantRequest,
    },
    repo::Plant,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/plants", post(create_plant))
        .route("/api/plants", get(list_plants))
        .route("/api/plants/:id", get(get_plant))
        .route("/api/plants/:id", put(update_plant))
        .route("/api/plants/:id", delete(delete_plant))
}

/// Existence before ownership: a nonexistent id is 404 for everyone, a
/// real id owned by someone else is 403 and leaks nothing.
fn check_owned(plant: Option<Plant>, requester: Uuid) -> Result<Plant, ApiError> {
    let plant = plant.ok_or_else(|| ApiError::NotFound("Plant not found".into()))?;
    if plant.owner_id != requester {
        return Err(ApiError::Forbidden(
            "This plant does not belong to you".into(),
        ));
    }
    Ok(plant)
}

async fn fetch_owned(db: &PgPool, id: Uuid, requester: Uuid) -> Result<Plant, ApiError> {
    check_owned(Plant::get_by_id(db, id).await?, requester)
}

#[instrument(skip(state, payload))]
pub async fn create_plant(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreatePlantRequest>,
) -> Result<(StatusCode, Json<CreatedPlantResponse>), ApiError> {
    let new = payload.into_new(claims.sub)?;
    let plant = Plant::insert(&state.db, &new).await?;

    info!(plant_id = %plant.id, owner_id = %claims.sub, "plant created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedPlantResponse {
            success: true,
            message: "Plant created successfully".into(),
            plant_id: plant.id,
            plant,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_plants(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PlantListResponse>, ApiError> {
    let plants = Plant::list_by_owner(&state.db, claims.sub).await?;
    Ok(Json(PlantListResponse {
        success: true,
        message: "Plants retrieved successfully".into(),
        plants,
    }))
}

#[instrument(skip(state))]
pub async fn get_plant(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PlantResponse>, ApiError> {
    let plant = fetch_owned(&state.db, id, claims.sub).await?;
    Ok(Json(PlantResponse {
        success: true,
        message: "Plant retrieved successfully".into(),
        plant,
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_plant(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlantRequest>,
) -> Result<Json<PlantResponse>, ApiError> {
    fetch_owned(&state.db, id, claims.sub).await?;
    let plant = Plant::update(&state.db, id, &payload.into()).await?;

    info!(plant_id = %id, owner_id = %claims.sub, "plant updated");
    Ok(Json(PlantResponse {
        success: true,
        message: "Plant updated successfully".into(),
        plant,
    }))
}

#[instrument(skip(state))]
pub async fn delete_plant(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    fetch_owned(&state.db, id, claims.sub).await?;
    Plant::delete(&state.db, id).await?;

    info!(plant_id = %id, owner_id = %claims.sub, "plant deleted");
    Ok(Json(DeletedResponse {
        success: true,
        message: "Plant deleted successfully".into(),
    }))
}
