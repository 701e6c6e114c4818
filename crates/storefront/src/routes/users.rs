//! User administration route handlers (admin only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use grips_gears_core::UserId;

use crate::api::{ApiError, UserRecord};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, push_flash};
use crate::models::Flash;
use crate::state::AppState;

const USERS_PAGE: &str = "/dashboard/users";

/// A row of the users table.
pub struct UserRow {
    pub record: UserRecord,
    /// The signed-in admin's own row has no delete action.
    pub is_self: bool,
}

/// All Users page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub page: PageContext,
    pub rows: Vec<UserRow>,
    pub error: Option<String>,
}

/// Display every registered user.
#[instrument(skip(state, page, admin), fields(email = %admin.email))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    page: PageContext,
) -> Result<Response, AppError> {
    let (users, error) = match state.api().users(admin.bearer()).await {
        Ok(users) => (users, None),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load users");
            (Vec::new(), Some("Failed to load users. Please try again.".to_string()))
        }
    };

    let rows = users
        .into_iter()
        .map(|record| UserRow {
            is_self: record.email.eq_ignore_ascii_case(&admin.email),
            record,
        })
        .collect();

    Ok(UsersTemplate { page, rows, error }.into_response())
}

/// Give a user the admin role.
#[instrument(skip(state, session, admin), fields(email = %admin.email))]
pub async fn promote(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let flash = match state.api().promote_user(&UserId::new(id), admin.bearer()).await {
        Ok(true) => Flash::success("User is an admin now!"),
        Ok(false) => Flash::info("User was already an admin."),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to promote user");
            Flash::error("Failed to update user role. Please try again.")
        }
    };
    push_flash(&session, flash).await;
    Ok(Redirect::to(USERS_PAGE))
}

/// Delete a user record.
#[instrument(skip(state, session, admin), fields(email = %admin.email))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let flash = match state.api().delete_user(&UserId::new(id), admin.bearer()).await {
        Ok(true) => Flash::success("User has been deleted."),
        Ok(false) => Flash::warning("User not found or already deleted"),
        Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized.into()),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete user");
            Flash::error("Failed to delete user. Please try again.")
        }
    };
    push_flash(&session, flash).await;
    Ok(Redirect::to(USERS_PAGE))
}
