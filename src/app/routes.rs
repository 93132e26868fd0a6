use axum::Router;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::admin::{SubjectSummary, UpsertError, UpsertInput, UpsertOutcome, summary, upsert};
use crate::app::state::AppState;
use crate::model::{Document, Note, Teacher, Video};
use crate::render::{self, AdminPage};
use crate::session::{LOGOUT_MESSAGE, LoginResult};
use crate::student::{Selection, StudentPage, StudentView};

pub fn router(state: AppState) -> Router {
    let fallback_file = state.services.content.fallback().local_path().cloned();

    let mut app = Router::new()
        .route("/healthz", get(|| async { "ok\n" }))
        .route("/", get(student_page))
        .route("/progress/toggle", post(toggle_progress_form))
        .route("/admin", get(admin_page))
        .route("/admin/login", post(admin_login))
        .route("/admin/logout", post(admin_logout))
        .route("/admin/content", post(admin_content_form))
        .route("/api/document", get(api_document))
        .route("/api/student", get(api_student))
        .route("/api/progress/:youtube_id/toggle", post(api_toggle_progress))
        .route("/api/admin/content", post(api_admin_content));

    if let Some(path) = fallback_file {
        app = app.route_service("/data.json", ServeFile::new(path));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn student_page(State(state): State<AppState>, Query(selection): Query<Selection>) -> Response {
    let services = &state.services;
    match StudentPage::open(&services.content, &services.progress, &selection).await {
        Ok(page) => Html(render::student_html(&page.view())).into_response(),
        Err(err) => {
            tracing::error!(?err, "load student page");
            (
                StatusCode::BAD_GATEWAY,
                Html(render::error_html(&format!("{err:#}"))),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToggleForm {
    video: String,
    subject: Option<String>,
    chapter: Option<String>,
}

async fn toggle_progress_form(
    State(state): State<AppState>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, (StatusCode, String)> {
    let video = form.video.trim();
    if video.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "video is required".to_string()));
    }
    state
        .services
        .progress
        .toggle(video)
        .await
        .map_err(internal_error)?;

    let selection = Selection {
        subject: form.subject,
        chapter: form.chapter,
    };
    Ok(Redirect::to(&render::page_href(&selection)))
}

async fn admin_page(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    render_admin(&state, None).await
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    password: String,
}

async fn admin_login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let result = state
        .services
        .session
        .login(&form.password)
        .await
        .map_err(internal_error)?;
    let page = render_admin(&state, Some(result.message().to_owned())).await?;
    let status = match result {
        LoginResult::Accepted => StatusCode::OK,
        LoginResult::Rejected => StatusCode::UNAUTHORIZED,
    };
    Ok((status, page).into_response())
}

async fn admin_logout(State(state): State<AppState>) -> Result<Html<String>, (StatusCode, String)> {
    state
        .services
        .session
        .logout()
        .await
        .map_err(internal_error)?;
    render_admin(&state, Some(LOGOUT_MESSAGE.to_owned())).await
}

/// Flat field names posted by the admin HTML form.
#[derive(Debug, Deserialize)]
struct UpsertForm {
    subject_name: String,
    chapter_title: String,
    chapter_overview: String,
    teacher_name: String,
    teacher_channel: String,
    teacher_topic: String,
    teacher_video_id: String,
    video_title: String,
    video_id: String,
    video_duration: String,
    note_type: String,
    note_content: String,
}

impl From<UpsertForm> for UpsertInput {
    fn from(form: UpsertForm) -> Self {
        Self {
            subject_name: form.subject_name,
            chapter_title: form.chapter_title,
            chapter_overview: form.chapter_overview,
            teacher: Teacher {
                name: form.teacher_name,
                channel: form.teacher_channel,
                topic: form.teacher_topic,
                video_id: form.teacher_video_id,
            },
            video: Video {
                title: form.video_title,
                youtube_id: form.video_id,
                duration: form.video_duration,
            },
            note: Note {
                kind: form.note_type,
                content: form.note_content,
            },
        }
    }
}

async fn admin_content_form(
    State(state): State<AppState>,
    Form(form): Form<UpsertForm>,
) -> Result<Response, (StatusCode, String)> {
    let input = UpsertInput::from(form);
    match save_content(&state, &input).await? {
        Ok(_) => {
            let message = "Changes saved.".to_owned();
            Ok(render_admin(&state, Some(message)).await?.into_response())
        }
        Err(SaveRejected::NotLoggedIn) => {
            let page = render_admin(&state, None).await?;
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
        Err(SaveRejected::Invalid(err)) => {
            let page = render_admin(&state, Some(err.to_string())).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

async fn api_document(State(state): State<AppState>) -> Result<Json<Document>, (StatusCode, String)> {
    let doc = state
        .services
        .content
        .load()
        .await
        .map_err(upstream_error)?;
    Ok(Json(doc))
}

async fn api_student(
    State(state): State<AppState>,
    Query(selection): Query<Selection>,
) -> Result<Json<StudentView>, (StatusCode, String)> {
    let services = &state.services;
    let page = StudentPage::open(&services.content, &services.progress, &selection)
        .await
        .map_err(upstream_error)?;
    Ok(Json(page.view()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleResponse {
    youtube_id: String,
    watched: bool,
}

async fn api_toggle_progress(
    State(state): State<AppState>,
    Path(youtube_id): Path<String>,
) -> Result<Json<ToggleResponse>, (StatusCode, String)> {
    let watched = state
        .services
        .progress
        .toggle(&youtube_id)
        .await
        .map_err(internal_error)?;
    Ok(Json(ToggleResponse {
        youtube_id,
        watched,
    }))
}

#[derive(Debug, Serialize)]
struct UpsertResponse {
    outcome: UpsertOutcome,
    summary: Vec<SubjectSummary>,
}

async fn api_admin_content(
    State(state): State<AppState>,
    Json(input): Json<UpsertInput>,
) -> Result<Json<UpsertResponse>, (StatusCode, String)> {
    match save_content(&state, &input).await? {
        Ok(response) => Ok(Json(response)),
        Err(SaveRejected::NotLoggedIn) => Err((
            StatusCode::UNAUTHORIZED,
            "admin session required".to_string(),
        )),
        Err(SaveRejected::Invalid(err)) => Err((StatusCode::UNPROCESSABLE_ENTITY, err.to_string())),
    }
}

enum SaveRejected {
    NotLoggedIn,
    Invalid(UpsertError),
}

/// Load, upsert, and persist. Concurrent saves are not coordinated; the last
/// write replaces the whole document. The session flag lives in the data
/// directory, so one login authorizes every client of this server.
async fn save_content(
    state: &AppState,
    input: &UpsertInput,
) -> Result<Result<UpsertResponse, SaveRejected>, (StatusCode, String)> {
    let services = &state.services;
    if !services.session.is_active().await.map_err(internal_error)? {
        return Ok(Err(SaveRejected::NotLoggedIn));
    }

    let mut doc = services.content.load().await.map_err(upstream_error)?;
    let outcome = match upsert(&mut doc, input) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(%err, "rejected content submission");
            return Ok(Err(SaveRejected::Invalid(err)));
        }
    };
    services
        .content
        .persist(&doc)
        .await
        .map_err(internal_error)?;

    Ok(Ok(UpsertResponse {
        outcome,
        summary: summary(&doc),
    }))
}

async fn render_admin(
    state: &AppState,
    message: Option<String>,
) -> Result<Html<String>, (StatusCode, String)> {
    let services = &state.services;
    let logged_in = services.session.is_active().await.map_err(internal_error)?;
    let summary = if logged_in {
        summary(&services.content.load().await.map_err(upstream_error)?)
    } else {
        Vec::new()
    };
    Ok(Html(render::admin_html(&AdminPage {
        logged_in,
        message,
        summary,
    })))
}

fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(?err, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
}

fn upstream_error(err: anyhow::Error) -> (StatusCode, String) {
    tracing::error!(?err, "content unavailable");
    (StatusCode::BAD_GATEWAY, format!("{err:#}"))
}
