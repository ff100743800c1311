use crate::job::TaskHandle;
use crate::output::html;
use crate::server::error::status_for;
use crate::server::{ApiError, AppState};
use crate::state::TaskState;
use crate::JobError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SpellcheckBody {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LinkForm {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub task_id: String,
    pub job_id: Uuid,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Blocking grammar check
pub async fn spellcheck(
    State(service): State<AppState>,
    payload: Result<Json<SpellcheckBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            return ApiError(JobError::InvalidParameters(rejection.body_text())).into_response()
        }
    };
    let url = body.url.unwrap_or_default();

    match service.check_page(&url, body.language.as_deref()).await {
        Ok(report) => Json(report).into_response(),
        Err(JobError::WorkerFailure { task_id, job_id }) => {
            tracing::warn!("Grammar check task {} for {} failed", task_id, url);
            match service.aggregator().error_report(job_id, TaskState::Failed) {
                Ok(report) => (StatusCode::BAD_GATEWAY, Json(report)).into_response(),
                Err(e) => ApiError(e).into_response(),
            }
        }
        Err(e) => ApiError(e).into_response(),
    }
}

pub async fn link_form() -> Html<String> {
    Html(html::link_form(None))
}

/// Submits a link task and redirects to its results page
pub async fn submit_links(State(service): State<AppState>, Form(form): Form<LinkForm>) -> Response {
    let url = form.url.unwrap_or_default();

    match service.submit_links(&url).await {
        Ok(submission) => Redirect::to(&results_path(
            &submission.handle.task_id,
            submission.job_id,
        ))
        .into_response(),
        Err(JobError::InvalidParameters(message)) => {
            (StatusCode::BAD_REQUEST, Html(html::link_form(Some(&message)))).into_response()
        }
        Err(e) => html_error(e),
    }
}

/// One poll; renders results, a pending page, or a failure page
pub async fn link_results(
    State(service): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> Response {
    let handle = TaskHandle {
        task_id: query.task_id.clone(),
        queue_name: service.dispatcher().queue().to_string(),
    };

    match service.link_results(&handle, query.job_id).await {
        Ok(report) => match report.status {
            TaskState::Finished => Html(html::link_results(&report)).into_response(),
            TaskState::Failed => {
                (StatusCode::BAD_GATEWAY, Html(html::link_failed(&report))).into_response()
            }
            state => Html(html::link_pending(
                state,
                &results_path(&query.task_id, query.job_id),
            ))
            .into_response(),
        },
        Err(JobError::UnknownTask { task_id }) => {
            (StatusCode::NOT_FOUND, Html(html::link_unknown(&task_id))).into_response()
        }
        Err(e) => html_error(e),
    }
}

pub(crate) fn results_path(task_id: &str, job_id: Uuid) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("task_id", task_id)
        .append_pair("job_id", &job_id.to_string())
        .finish();
    format!("/links/results?{}", query)
}

fn html_error(error: JobError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::warn!("Request failed: {}", error);
    }
    let title = status.canonical_reason().unwrap_or("Error");
    (status, Html(html::error_page(title, &error.to_string()))).into_response()
}
