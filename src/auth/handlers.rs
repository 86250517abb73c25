use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{error::ApiError, extract::Json, state::AppState};

use super::{
    dto::{AuthResponse, LoginRequest, ProfileResponse, SignupRequest, SignupResponse},
    jwt::{AuthUser, JwtKeys},
    password::{hash_password, verify_password},
    repo::{NewUser, User},
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/user/profile", get(profile))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_signup(payload: &SignupRequest) -> Result<(), ApiError> {
    if payload.firstname.trim().is_empty()
        || payload.lastname.trim().is_empty()
        || payload.username.trim().is_empty()
        || payload.email.is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::Validation(
            "firstname, lastname, username, email and password are required".into(),
        ));
    }
    if payload.username.contains(char::is_whitespace) {
        return Err(ApiError::Validation("Username must not contain spaces".into()));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok(())
}

/// Emails are unique and case-sensitive; an already-registered email is
/// a conflict, never a server error.
fn ensure_email_available(existing: Option<&User>) -> Result<(), ApiError> {
    if let Some(user) = existing {
        warn!(email = %user.email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }
    Ok(())
}

/// Two signups can pass the availability check at once; the loser hits
/// the UNIQUE constraint on insert and still gets the conflict answer.
fn signup_create_error(e: anyhow::Error) -> ApiError {
    let unique_violation = e
        .downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false);
    if unique_violation {
        ApiError::Conflict("User already exists".into())
    } else {
        ApiError::Store(e)
    }
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    validate_signup(&payload)?;

    let existing = User::find_by_email(&state.db, &payload.email).await?;
    ensure_email_available(existing.as_ref())?;

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            email: &payload.email,
            username: &payload.username,
            firstname: &payload.firstname,
            lastname: &payload.lastname,
            password_hash: &hash,
        },
    )
    .await
    .map_err(signup_create_error)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "User created successfully".into(),
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::Unauthenticated("Invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthenticated("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, &user.username)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_payload() -> SignupRequest {
        SignupRequest {
            firstname: "Gerda".into(),
            lastname: "Greenthumb".into(),
            username: "gardener".into(),
            email: "Gardener@Example.com".into(),
            password: "long-enough-password".into(),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("Gardener@Example.com"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn signup_accepts_complete_payload() {
        assert!(validate_signup(&signup_payload()).is_ok());
    }

    #[test]
    fn signup_rejects_missing_fields() {
        let mut p = signup_payload();
        p.firstname = "".into();
        assert!(validate_signup(&p).is_err());

        let mut p = signup_payload();
        p.password = "".into();
        assert!(validate_signup(&p).is_err());
    }

    #[test]
    fn signup_rejects_username_with_spaces() {
        let mut p = signup_payload();
        p.username = "john doe".into();
        let err = validate_signup(&p).unwrap_err();
        assert!(err.to_string().contains("spaces"));
    }

    #[test]
    fn signup_rejects_short_password() {
        let mut p = signup_payload();
        p.password = "short".into();
        let err = validate_signup(&p).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    fn existing_user() -> User {
        User {
            id: uuid::Uuid::new_v4(),
            email: "Gardener@Example.com".into(),
            username: "gardener".into(),
            firstname: "Gerda".into(),
            lastname: "Greenthumb".into(),
            password_hash: "$argon2id$hash".into(),
            created_at: time::OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn second_signup_with_used_email_is_a_conflict() {
        let user = existing_user();
        let err = ensure_email_available(Some(&user)).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn unused_email_is_available() {
        assert!(ensure_email_available(None).is_ok());
    }

    #[test]
    fn non_duplicate_insert_failures_stay_server_errors() {
        let err = signup_create_error(anyhow::anyhow!("connection reset"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // A sqlx error that is not a unique violation must not become 409.
        let err = signup_create_error(anyhow::Error::from(sqlx::Error::RowNotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
