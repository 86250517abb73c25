use serde::{Deserialize, Serialize};
use time::{macros::format_description, OffsetDateTime};
use uuid::Uuid;

use crate::error::ApiError;

use super::repo::{NewPlant, Plant, PlantChanges};

/// Create payload. Only `name` and `species` are required; everything
/// else defaults (numerics to 0, strings to empty, plantDate to today).
/// Owner fields are not accepted here at all.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlantRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    pub location: Option<String>,
    pub plant_date: Option<String>,
    pub soil_moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub notes: Option<String>,
}

impl CreatePlantRequest {
    pub fn into_new(self, owner_id: Uuid) -> Result<NewPlant, ApiError> {
        if self.name.trim().is_empty() || self.species.trim().is_empty() {
            return Err(ApiError::Validation(
                "Plant name and species are required".into(),
            ));
        }
        let plant_date = match self.plant_date {
            Some(d) if !d.is_empty() => d,
            _ => today(),
        };
        Ok(NewPlant {
            owner_id,
            name: self.name,
            species: self.species,
            location: self.location.unwrap_or_default(),
            plant_date,
            soil_moisture: self.soil_moisture.unwrap_or(0.0),
            temperature: self.temperature.unwrap_or(0.0),
            humidity: self.humidity.unwrap_or(0.0),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

fn today() -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    OffsetDateTime::now_utc()
        .date()
        .format(&fmt)
        .unwrap_or_default()
}

/// Update payload. Unknown fields (including ownerId and createdAt sent
/// by a client) are silently dropped by the deserializer.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlantRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    pub location: Option<String>,
    pub plant_date: Option<String>,
    pub soil_moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub notes: Option<String>,
}

impl From<UpdatePlantRequest> for PlantChanges {
    fn from(r: UpdatePlantRequest) -> Self {
        Self {
            name: r.name,
            species: r.species,
            location: r.location,
            plant_date: r.plant_date,
            soil_moisture: r.soil_moisture,
            temperature: r.temperature,
            humidity: r.humidity,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPlantResponse {
    pub success: bool,
    pub message: String,
    pub plant_id: Uuid,
    pub plant: Plant,
}

#[derive(Debug, Serialize)]
pub struct PlantResponse {
    pub success: bool,
    pub message: String,
    pub plant: Plant,
}

#[derive(Debug, Serialize)]
pub struct PlantListResponse {
    pub success: bool,
    pub message: String,
    pub plants: Vec<Plant>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}
