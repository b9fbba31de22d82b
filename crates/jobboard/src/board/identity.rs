use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::domain::{User, UserId};
use super::repository::{EmployerNotifier, JobBoardRepository};
use super::router::error_response;
use super::service::JobBoardService;

/// Header carrying the user id resolved by the authentication layer in front of the board.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Viewer identity when one is present; anonymous requests resolve to `None`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// Identity required by apply/save. Missing or unknown users are rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

fn header_user_id(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(UserId::parse)
}

#[async_trait]
impl<R, N> FromRequestParts<Arc<JobBoardService<R, N>>> for CurrentUser
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<JobBoardService<R, N>>,
    ) -> Result<Self, Self::Rejection> {
        let Some(id) = header_user_id(parts) else {
            return Ok(Self(None));
        };
        let user = service.find_user(id).await.map_err(error_response)?;
        Ok(Self(user))
    }
}

#[async_trait]
impl<R, N> FromRequestParts<Arc<JobBoardService<R, N>>> for AuthenticatedUser
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        service: &Arc<JobBoardService<R, N>>,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, service).await? {
            CurrentUser(Some(user)) => Ok(Self(user)),
            CurrentUser(None) => {
                tracing::warn!("identity missing, request denied");
                let payload = json!({ "error": "unauthenticated" });
                Err((StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response())
            }
        }
    }
}
