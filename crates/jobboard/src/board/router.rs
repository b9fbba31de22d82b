use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::JobId;
use super::identity::{AuthenticatedUser, CurrentUser};
use super::repository::{EmployerNotifier, JobBoardRepository};
use super::search::JobSearchParams;
use super::service::{ActionOutcome, BoardServiceError, JobBoardService};

pub const FLASH_LEVEL_HEADER: &str = "x-flash-level";

/// Body for apply/save, sent either as a form or as JSON.
#[derive(Debug, Default, Deserialize)]
pub struct JobActionForm {
    #[serde(default)]
    pub id: Option<RawJobId>,
}

/// JSON clients send the id as a number, forms always as text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawJobId {
    Number(i64),
    Text(String),
}

impl JobActionForm {
    /// The requested job, `None` when the id is missing or not numeric.
    pub fn job_id(&self) -> Option<JobId> {
        match self.id.as_ref()? {
            RawJobId::Number(id) => Some(JobId(*id)),
            RawJobId::Text(raw) => JobId::parse(raw),
        }
    }
}

/// Picks the JSON or form decoder from `Content-Type`; anything that is not JSON is read as a
/// form.
#[async_trait]
impl<S> FromRequest<S> for JobActionForm
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| {
                let mime = value.split(';').next().unwrap_or_default().trim();
                mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
            });

        if is_json {
            Json::<JobActionForm>::from_request(req, state)
                .await
                .map(|Json(form)| form)
                .map_err(IntoResponse::into_response)
        } else {
            Form::<JobActionForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .map_err(IntoResponse::into_response)
        }
    }
}

/// Router builder exposing the listing, detail, apply and save endpoints.
pub fn board_router<R, N>(service: Arc<JobBoardService<R, N>>) -> Router
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    Router::new()
        .route("/jobs", get(list_handler::<R, N>))
        .route("/jobs/apply", post(apply_handler::<R, N>))
        .route("/jobs/save", post(save_handler::<R, N>))
        .route("/jobs/:id", get(detail_handler::<R, N>))
        .with_state(service)
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<JobBoardService<R, N>>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    let params = JobSearchParams::from_pairs(pairs);
    match service.list_jobs(&params).await {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn detail_handler<R, N>(
    State(service): State<Arc<JobBoardService<R, N>>>,
    CurrentUser(viewer): CurrentUser,
    Path(raw_id): Path<String>,
) -> Response
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    let Some(job_id) = JobId::parse(&raw_id) else {
        return not_found();
    };

    match service.job_detail(job_id, viewer.as_ref()).await {
        Ok(detail) => (StatusCode::OK, axum::Json(detail)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn apply_handler<R, N>(
    State(service): State<Arc<JobBoardService<R, N>>>,
    AuthenticatedUser(user): AuthenticatedUser,
    form: JobActionForm,
) -> Response
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    let job_id = form.job_id();
    match service.apply(&user, job_id).await {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn save_handler<R, N>(
    State(service): State<Arc<JobBoardService<R, N>>>,
    AuthenticatedUser(user): AuthenticatedUser,
    form: JobActionForm,
) -> Response
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    let job_id = form.job_id();
    match service.save(&user, job_id).await {
        Ok(outcome) => outcome_response(outcome),
        Err(err) => error_response(err),
    }
}

/// Success and rejection alike answer 200; the flash level travels in a header.
fn outcome_response(outcome: ActionOutcome) -> Response {
    let flash = outcome.flash();
    (
        StatusCode::OK,
        [(HeaderName::from_static(FLASH_LEVEL_HEADER), flash.level.label())],
        axum::Json(outcome),
    )
        .into_response()
}

fn not_found() -> Response {
    let payload = json!({ "error": "job not found" });
    (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
}

pub(crate) fn error_response(err: BoardServiceError) -> Response {
    match err {
        BoardServiceError::NotFound(_) => not_found(),
        other => {
            tracing::error!(error = %other, "board request failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
