use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::TransactionTrait;

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse, SessionView, SignupRequest, SignupResponse},
    error::{AppError, AppResult},
    mappers::{
        AddOutcome, CustomerMapper, EmployeeMapper, LoginMapper,
        customers::insert_customer, logins::insert_login,
    },
    middleware::auth::{Actor, jwt_secret},
    models::{Customer, Role, UserLogin, UserType},
    response::ApiResponse,
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Checks the credentials, opens the session and resolves who the user is.
/// Employees get the role of their job; customers get the customer role.
pub async fn authenticate(state: &AppState, username: &str, password: &str) -> AppResult<Actor> {
    let logins = LoginMapper::new(state);
    let login = logins
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid username or password".into()))?;

    if !verify_password(&login.password, password)? {
        return Err(AppError::BadRequest("Invalid username or password".into()));
    }
    if login.active {
        return Err(AppError::Conflict(format!("'{username}' is already logged in")));
    }

    let actor = resolve_actor(state, &login).await?;
    logins.set_active(username, true).await?;
    tracing::info!(username, role = %actor.role, "user logged in");
    Ok(actor)
}

async fn resolve_actor(state: &AppState, login: &UserLogin) -> AppResult<Actor> {
    let owner_id = login.owner_id.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("login '{}' has no owner", login.username))
    })?;

    match login.user_type {
        UserType::Employee => {
            let employee = EmployeeMapper::new(state)
                .find_by_id(owner_id)
                .await?
                .ok_or(AppError::NotFound)?;
            Ok(Actor::new(
                login.username.clone(),
                employee.full_name(),
                Role::from(employee.role),
            ))
        }
        UserType::Customer => {
            let customer = CustomerMapper::new(state)
                .find_by_id(owner_id)
                .await?
                .ok_or(AppError::NotFound)?;
            Ok(Actor::new(
                login.username.clone(),
                customer.full_name(),
                Role::Customer,
            ))
        }
    }
}

pub fn issue_token(actor: &Actor) -> AppResult<String> {
    sign_token(actor, &jwt_secret()?)
}

/// Signs a 12 hour token for `actor` with `secret`.
pub fn sign_token(actor: &Actor, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(12))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: actor.username.clone(),
        name: actor.name.clone(),
        role: actor.role.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let actor = authenticate(state, &payload.username, &payload.password).await?;
    let token = match issue_token(&actor) {
        Ok(token) => token,
        Err(err) => {
            // Leave the session closed so the user can retry.
            LoginMapper::new(state).set_active(&actor.username, false).await?;
            return Err(err);
        }
    };

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        name: actor.name,
        role: actor.role.to_string(),
    };
    Ok(ApiResponse::ok("Logged in", resp))
}

/// Closes the session for `username`. Fails when it is not open.
pub async fn logout(state: &AppState, username: &str) -> AppResult<()> {
    let logins = LoginMapper::new(state);
    let login = logins
        .find_by_username(username)
        .await?
        .ok_or(AppError::NotFound)?;
    if !login.active {
        return Err(AppError::BadRequest(format!("'{username}' is not logged in")));
    }

    logins.set_active(username, false).await?;
    tracing::info!(username, "user logged out");
    Ok(())
}

pub async fn logout_user(state: &AppState, actor: &Actor) -> AppResult<ApiResponse<SessionView>> {
    logout(state, &actor.username).await?;
    let user_type = if actor.role == Role::Customer {
        UserType::Customer
    } else {
        UserType::Employee
    };
    Ok(ApiResponse::ok(
        "Logged out",
        SessionView {
            username: actor.username.clone(),
            user_type: user_type.as_str().to_string(),
        },
    ))
}

/// Self-service customer registration: stores the customer and a login for
/// them. Rejects a known email or a taken username.
pub async fn signup_customer(
    state: &AppState,
    payload: SignupRequest,
) -> AppResult<ApiResponse<SignupResponse>> {
    let SignupRequest {
        first_name,
        last_name,
        email,
        phone_number,
        username,
        password,
    } = payload;

    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::Validation("username and password are required".into()));
    }

    let mut customer = Customer::new(first_name, last_name, email);
    customer.phone_number = phone_number;
    let password = hash_password(&password)?;

    // Customer and login are stored together or not at all.
    let txn = state.orm.begin().await?;
    let customer_id = match insert_customer(&txn, &customer).await? {
        AddOutcome::Added(id) => id,
        AddOutcome::Conflict => {
            txn.rollback().await?;
            return Err(AppError::Conflict(format!(
                "a customer with email '{}' already exists",
                customer.email_address
            )));
        }
    };

    let login = UserLogin::new(username.clone(), password, UserType::Customer, Some(customer_id));
    if let AddOutcome::Conflict = insert_login(&txn, &login).await? {
        txn.rollback().await?;
        return Err(AppError::Conflict(format!("username '{username}' is taken")));
    }
    txn.commit().await?;

    tracing::info!(username = %username, customer_id, "customer signed up");
    Ok(ApiResponse::ok(
        "Customer created",
        SignupResponse {
            username,
            customer_id,
        },
    ))
}
