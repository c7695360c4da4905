use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::{AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        repo::{EmailTaken, UserRepo},
        repo_types::{NewUser, User, DEFAULT_ROLE},
    },
    error::ApiError,
    validation::Violations,
};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks the raw registration payload, including the plaintext password,
/// before anything is hashed.
fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut v = Violations::default();
    v.not_blank("firstName", req.first_name.as_deref(), "First name is required.");
    v.not_blank("lastName", req.last_name.as_deref(), "Last name is required.");
    v.not_blank("phoneNumber", req.phone_number.as_deref(), "Phone number is required.");
    v.not_blank("email", req.email.as_deref(), "Email is required.");
    v.matches("email", req.email.as_deref(), &EMAIL_RE, "Email is not a valid address.");
    v.not_blank("password", req.password.as_deref(), "Password is required.");
    v.into_result()
}

/// Registers a user with the default role. Emails are unique after
/// normalization.
pub async fn register(
    users: &dyn UserRepo,
    pepper: &str,
    mut req: RegisterRequest,
) -> Result<User, ApiError> {
    req.email = req.email.as_deref().map(normalize_email);
    validate_registration(&req)?;

    let (Some(first_name), Some(last_name), Some(phone_number), Some(email), Some(password)) = (
        req.first_name,
        req.last_name,
        req.phone_number,
        req.email,
        req.password,
    ) else {
        return Err(ApiError::BadRequest("Incomplete registration".into()));
    };

    let taken = || ApiError::Conflict("Email already registered".into());
    if users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(taken());
    }

    let password_hash = hash_password(&password, pepper)?;
    let user = users
        .create(NewUser {
            first_name,
            last_name,
            phone_number,
            email,
            password_hash,
            roles: vec![DEFAULT_ROLE.to_string()],
        })
        .await
        .map_err(|e| {
            if e.is::<EmailTaken>() {
                warn!(error = %e, "email registered concurrently");
                taken()
            } else {
                ApiError::Internal(e)
            }
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Resolves the user behind a verified token. A token whose user no longer
/// exists is treated as unauthenticated.
pub async fn current_user(users: &dyn UserRepo, AuthUser(id): AuthUser) -> Result<User, ApiError> {
    users.find_by_id(id).await?.ok_or_else(|| {
        warn!(user_id = %id, "token for unknown user");
        ApiError::Unauthorized("Unknown user".into())
    })
}

/// Verifies credentials and issues an access token.
pub async fn login(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    pepper: &str,
    req: LoginRequest,
) -> Result<String, ApiError> {
    let email = normalize_email(&req.email);
    let invalid = || ApiError::Unauthorized("Invalid credentials".into());

    let Some(user) = users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(&req.password, &user.password_hash, pepper)? {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
