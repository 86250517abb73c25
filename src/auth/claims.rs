use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload used for authentication. Carried on every request after
/// login; handlers read the identity from here, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,        // user ID
    pub email: String,    // user email at time of issue
    pub username: String, // username at time of issue
    pub iat: usize,       // issued at (unix timestamp)
    pub exp: usize,       // expires at (unix timestamp)
    pub iss: String,      // issuer
    pub aud: String,      // audience
}
