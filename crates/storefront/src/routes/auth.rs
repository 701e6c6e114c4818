//! Authentication route handlers.
//!
//! Passwords are checked by the identity provider; a verified email is then
//! exchanged for a storefront API token which lives in the session for the
//! rest of the visit.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use grips_gears_core::UserRole;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    PageContext, clear_current_user, push_flash, set_current_user,
};
use crate::models::{CurrentUser, Flash};
use crate::services::IdentityError;
use crate::services::cart::merge_local_cart;
use crate::state::AppState;

use super::local_path;

/// Shown for any failure the visitor cannot fix themselves.
const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub from: Option<String>,
}

/// Sign-up form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters of the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Where to go after signing in.
    pub from: Option<String>,
    /// Set when the API rejected the session's token.
    pub expired: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub email: String,
    pub from: String,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub error: Option<String>,
    pub name: String,
    pub email: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// `?expired=1` means the API refused the stored token: the stale user is
/// dropped before the form is shown.
#[instrument(skip(session, page))]
pub async fn login_page(
    session: Session,
    Query(query): Query<LoginQuery>,
    mut page: PageContext,
) -> Result<Response, AppError> {
    if query.expired.is_some() {
        clear_current_user(&session).await?;
        clear_sentry_user();
        page.user = None;
        page.flashes
            .push(Flash::warning("Your session has expired. Please log in again."));
    }

    Ok(LoginTemplate {
        page,
        error: None,
        email: String::new(),
        from: local_path(query.from.as_deref()).unwrap_or("/").to_string(),
    }
    .into_response())
}

/// Handle login form submission.
#[instrument(skip(state, session, page, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Response {
    let from = local_path(form.from.as_deref()).unwrap_or("/").to_string();
    let email = form.email.trim().to_string();

    let error = if email.is_empty() || form.password.is_empty() {
        "Please fill in all fields."
    } else {
        match sign_in(&state, &session, &email, &form.password).await {
            Ok(user) => {
                set_sentry_user(&user.email);
                push_flash(&session, Flash::success("Login successful!")).await;
                return Redirect::to(&from).into_response();
            }
            Err(AppError::Identity(IdentityError::InvalidCredentials)) => {
                tracing::info!("Login refused: invalid credentials");
                "Incorrect email or password."
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                GENERIC_FAILURE
            }
        }
    };

    LoginTemplate {
        page,
        error: Some(error.to_string()),
        email,
        from,
    }
    .into_response()
}

/// Verify the password, obtain an API token and store the user in the
/// session. The visitor's session cart is merged into the remote cart.
async fn sign_in(
    state: &AppState,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<CurrentUser, AppError> {
    let identity = state.identity().sign_in(email, password).await?;
    let token = state.api().issue_token(&identity.email).await?;

    let role = match state.api().is_admin(&identity.email, &token).await {
        Ok(true) => UserRole::Admin,
        Ok(false) => UserRole::User,
        Err(e) => {
            tracing::warn!(error = %e, "Admin check failed; signing in as user");
            UserRole::User
        }
    };

    let user = CurrentUser::new(
        identity.email,
        identity.display_name.unwrap_or_default(),
        role,
        token,
    );
    set_current_user(session, &user).await?;

    match merge_local_cart(state.api(), session, &user).await {
        Ok(0) => {}
        Ok(merged) => tracing::info!(merged, "Merged visitor cart"),
        Err(e) => tracing::warn!(error = %e, "Failed to merge visitor cart"),
    }

    Ok(user)
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(page: PageContext) -> impl IntoResponse {
    SignupTemplate {
        page,
        error: None,
        name: String::new(),
        email: String::new(),
    }
}

/// Handle sign-up form submission.
///
/// Creates the identity account, sets its display name and registers the
/// user record with the API. The visitor then signs in normally.
#[instrument(skip(state, session, page, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<SignupForm>,
) -> Response {
    let name = form.name.trim().to_string();
    let email = form.email.trim().to_string();

    let error = match validate_signup(&name, &email, &form.password) {
        Err(message) => message,
        Ok(()) => match register(&state, &name, &email, &form.password).await {
            Ok(()) => {
                push_flash(
                    &session,
                    Flash::success("Account created successfully! Please log in."),
                )
                .await;
                return Redirect::to("/login").into_response();
            }
            Err(IdentityError::EmailExists) => "An account with this email already exists.",
            Err(IdentityError::InvalidEmail) => "Please enter a valid email address",
            Err(IdentityError::WeakPassword) => "Password must be at least 6 characters",
            Err(e) => {
                tracing::error!(error = %e, "Sign-up failed");
                GENERIC_FAILURE
            }
        },
    };

    SignupTemplate {
        page,
        error: Some(error.to_string()),
        name,
        email,
    }
    .into_response()
}

fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), &'static str> {
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err("Please fill in all fields.");
    }
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), IdentityError> {
    let account = state.identity().sign_up(email, password).await?;

    if let Err(e) = state.identity().set_display_name(&account, name).await {
        tracing::warn!(error = %e, "Failed to set display name");
    }

    match state.api().register_user(name, &account.email).await {
        Ok(true) => tracing::info!("Registered user record"),
        Ok(false) => tracing::info!("User record already existed"),
        Err(e) => tracing::error!(error = %e, "Failed to register user record"),
    }
    Ok(())
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    session.cycle_id().await?;
    clear_sentry_user();
    push_flash(&session, Flash::success("Logged out successfully!")).await;
    Ok(Redirect::to("/"))
}
