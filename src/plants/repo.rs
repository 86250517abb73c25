use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Plant record. Wire names are camelCase to match the API contract;
/// columns stay snake_case.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub species: String,
    pub location: String,
    pub plant_date: String,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Fully-defaulted insert payload. Owner comes from the token, never the
/// client.
#[derive(Debug)]
pub struct NewPlant {
    pub owner_id: Uuid,
    pub name: String,
    pub species: String,
    pub location: String,
    pub plant_date: String,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub notes: String,
}

/// Partial update; `None` keeps the stored value. `owner_id` and
/// `created_at` are not representable here, so they cannot be overwritten.
#[derive(Debug, Default)]
pub struct PlantChanges {
    pub name: Option<String>,
    pub species: Option<String>,
    pub location: Option<String>,
    pub plant_date: Option<String>,
    pub soil_moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub notes: Option<String>,
}

const PLANT_COLUMNS: &str = "id, owner_id, name, species, location, plant_date, \
                             soil_moisture, temperature, humidity, notes, created_at, updated_at";

impl Plant {
    pub async fn insert(db: &PgPool, new: &NewPlant) -> anyhow::Result<Plant> {
        let plant = sqlx::query_as::<_, Plant>(&format!(
            r#"
            INSERT INTO plants
                (owner_id, name, species, location, plant_date,
                 soil_moisture, temperature, humidity, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PLANT_COLUMNS}
            "#,
        ))
        .bind(new.owner_id)
        .bind(&new.name)
        .bind(&new.species)
        .bind(&new.location)
        .bind(&new.plant_date)
        .bind(new.soil_moisture)
        .bind(new.temperature)
        .bind(new.humidity)
        .bind(&new.notes)
        .fetch_one(db)
        .await?;
        Ok(plant)
    }

    pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<Vec<Plant>> {
        let rows = sqlx::query_as::<_, Plant>(&format!(
            r#"
            SELECT {PLANT_COLUMNS}
            FROM plants
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Fetch by id alone; the ownership check belongs to the handler so
    /// that a missing plant is 404 before a foreign plant is 403.
    pub async fn get_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Plant>> {
        let plant = sqlx::query_as::<_, Plant>(&format!(
            r#"
            SELECT {PLANT_COLUMNS}
            FROM plants
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(plant)
    }

    pub async fn update(db: &PgPool, id: Uuid, changes: &PlantChanges) -> anyhow::Result<Plant> {
        let plant = sqlx::query_as::<_, Plant>(&format!(
            r#"
            UPDATE plants SET
                name = COALESCE($2, name),
                species = COALESCE($3, species),
                location = COALESCE($4, location),
                plant_date = COALESCE($5, plant_date),
                soil_moisture = COALESCE($6, soil_moisture),
                temperature = COALESCE($7, temperature),
                humidity = COALESCE($8, humidity),
                notes = COALESCE($9, notes),
                updated_at = now()
            WHERE id = $1
            RETURNING {PLANT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.species)
        .bind(&changes.location)
        .bind(&changes.plant_date)
        .bind(changes.soil_moisture)
        .bind(changes.temperature)
        .bind(changes.humidity)
        .bind(&changes.notes)
        .fetch_one(db)
        .await?;
        Ok(plant)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM plants WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
