use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlantIdConfig {
    pub api_key: String,
    pub api_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub plant_id: PlantIdConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "plantmonitor".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "plantmonitor-users".into()),
            // Tokens live for one day unless overridden.
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let plant_id = PlantIdConfig {
            api_key: std::env::var("PLANT_ID_API_KEY")?,
            api_url: std::env::var("PLANT_ID_API_URL")
                .unwrap_or_else(|_| "https://api.plant.id/v3/identification".into()),
            timeout_secs: std::env::var("PLANT_ID_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };
        Ok(Self {
            database_url,
            jwt,
            plant_id,
        })
    }
}
