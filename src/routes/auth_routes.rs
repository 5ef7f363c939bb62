use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::State;
use axum::response::Json;
use jsonwebtoken::{encode, EncodingKey, Header};
use validator::Validate;

use crate::config::get_config;
use crate::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::{PublicUser, User};
use crate::AppState;

const TOKEN_TTL_SECS: usize = 60 * 60 * 24;

fn issue_token(user: &User) -> Result<String> {
    let config = get_config();
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role.clone(),
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Token creation failed: {}", e)))
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;
    let role = payload.role.to_lowercase();
    if role != "recruiter" && role != "candidate" {
        return Err(Error::BadRequest("Unknown role".to_string()));
    }

    let existing: Option<(uuid::Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(payload.email.to_lowercase())
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict("Email already registered".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&payload.name)
    .bind(payload.email.to_lowercase())
    .bind(&password_hash)
    .bind(&role)
    .fetch_one(&state.pool)
    .await?;

    let token = issue_token(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(payload.email.to_lowercase())
        .fetch_optional(&state.pool)
        .await?;
    let user = user.ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| Error::Internal(format!("Stored hash is invalid: {}", e)))?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| Error::Unauthorized("Invalid credentials".to_string()))?;

    let token = issue_token(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}
