//! HTTP surface for SaveKar.
//!
//! Every route under `/api` resolves the calling owner with the [`Owner`]
//! extractor and delegates to the owner-scoped managers or to the async
//! services on [`App`]. Store work runs while holding the database lock and
//! never across an `.await`.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::app::App;
use crate::database::connection::lock;
use crate::managers::folder_manager::{FolderManager, FolderManagerTrait};
use crate::managers::tag_manager::{TagManager, TagManagerTrait};
use crate::managers::website_manager::{WebsiteManager, WebsiteManagerTrait};
use crate::services::identity::resolve_owner;
use crate::types::errors::{
    ErrorKind, FolderError, IdentityError, ReminderError, TagError, WebsiteError,
};
use crate::types::folder::{folder_reference, FolderUpdate, NewFolder};
use crate::types::tag::DEFAULT_TAG_COLOR;
use crate::types::website::{ContentType, FolderScope, NewWebsite, Website, WebsiteFilter, WebsiteUpdate};

// === ApiError ===

/// Error response: `{"error": message}` with a status derived from the kind.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    existing: Option<Box<Website>>,
}

impl ApiError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            existing: None,
        }
    }

    /// Logs `detail` and hides it from the caller.
    fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "internal error");
        Self::new(ErrorKind::Internal, "Internal Server Error")
    }

    fn from_kind(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::Internal => Self::internal(message),
            _ => Self::new(kind, message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<FolderError> for ApiError {
    fn from(err: FolderError) -> Self {
        match err {
            // Reported as a plain bad request, as clients expect.
            FolderError::HasSubfolders(_) => Self::new(ErrorKind::BadRequest, err.to_string()),
            _ => Self::from_kind(err.kind(), err.to_string()),
        }
    }
}

impl From<WebsiteError> for ApiError {
    fn from(err: WebsiteError) -> Self {
        let message = err.to_string();
        match err {
            WebsiteError::DuplicateUrl(existing) => Self {
                kind: ErrorKind::Conflict,
                message,
                existing: Some(existing),
            },
            other => Self::from_kind(other.kind(), message),
        }
    }
}

impl From<TagError> for ApiError {
    fn from(err: TagError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

impl From<ReminderError> for ApiError {
    fn from(err: ReminderError) -> Self {
        Self::from_kind(err.kind(), err.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        Self::new(ErrorKind::Unauthorized, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match self.existing {
            Some(existing) => json!({
                "error": "URL_EXISTS",
                "message": self.message,
                "existingWebsite": existing,
            }),
            None => json!({ "error": self.message }),
        };

        (status, Json(body)).into_response()
    }
}

// === Owner ===

/// The authenticated owner of the request.
#[derive(Debug, Clone)]
pub struct Owner(pub String);

#[axum::async_trait]
impl FromRequestParts<Arc<App>> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<App>) -> Result<Self, Self::Rejection> {
        resolve_owner(&parts.headers, &state.settings.auth.identity_header)
            .map(Owner)
            .map_err(ApiError::from)
    }
}

/// Runs `f` against the locked connection.
fn with_conn<T>(app: &App, f: impl FnOnce(&Connection) -> Result<T, ApiError>) -> Result<T, ApiError> {
    let db = lock(&app.db).map_err(ApiError::internal)?;
    f(db.connection())
}

// === Folders ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderListQuery {
    parent_id: Option<String>,
}

async fn list_folders(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Query(query): Query<FolderListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let folders = with_conn(&app, |conn| {
        Ok(FolderManager::new(conn, &owner).list_folders(folder_reference(query.parent_id.as_deref()))?)
    })?;
    Ok(Json(folders))
}

async fn create_folder(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Json(mut input): Json<NewFolder>,
) -> Result<impl IntoResponse, ApiError> {
    input.parent_id = folder_reference(input.parent_id.as_deref()).map(str::to_string);
    let folder = with_conn(&app, |conn| Ok(FolderManager::new(conn, &owner).create_folder(&input)?))?;
    Ok(Json(folder))
}

async fn folder_tree(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
) -> Result<impl IntoResponse, ApiError> {
    let tree = with_conn(&app, |conn| Ok(FolderManager::new(conn, &owner).folder_tree()?))?;
    Ok(Json(tree))
}

async fn get_folder(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let folder = with_conn(&app, |conn| Ok(FolderManager::new(conn, &owner).get_folder(&id)?))?;
    Ok(Json(folder))
}

async fn update_folder(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(update): Json<FolderUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let folder = with_conn(&app, |conn| {
        Ok(FolderManager::new(conn, &owner).update_folder(&id, &update)?)
    })?;
    Ok(Json(folder))
}

async fn delete_folder(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    with_conn(&app, |conn| Ok(FolderManager::new(conn, &owner).delete_folder(&id)?))?;
    Ok(Json(json!({ "message": "Folder deleted successfully" })))
}

async fn folder_breadcrumb(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let crumbs = with_conn(&app, |conn| {
        Ok(FolderManager::new(conn, &owner).breadcrumb(folder_reference(Some(&id)))?)
    })?;
    Ok(Json(crumbs))
}

// === Websites ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebsiteListQuery {
    #[serde(rename = "type")]
    content_type: Option<String>,
    search: Option<String>,
    favorites: Option<String>,
    folder_id: Option<String>,
}

impl WebsiteListQuery {
    fn into_filter(self) -> Result<WebsiteFilter, WebsiteError> {
        let content_type = match self.content_type.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(raw.parse::<ContentType>()?),
        };
        Ok(WebsiteFilter {
            content_type,
            search: self.search,
            favorites_only: self.favorites.as_deref() == Some("true"),
            folder: FolderScope::from_query(self.folder_id.as_deref()),
        })
    }
}

async fn list_websites(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Query(query): Query<WebsiteListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter()?;
    let websites = with_conn(&app, |conn| Ok(WebsiteManager::new(conn, &owner).list_websites(&filter)?))?;
    Ok(Json(websites))
}

async fn create_website(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Json(input): Json<NewWebsite>,
) -> Result<impl IntoResponse, ApiError> {
    let website = app.websites.create(&owner, input).await?;
    Ok(Json(website))
}

async fn replace_website(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Json(input): Json<NewWebsite>,
) -> Result<impl IntoResponse, ApiError> {
    let website = app.websites.replace(&owner, input).await?;
    Ok(Json(website))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    #[serde(default)]
    url: String,
}

async fn preview_website(
    State(app): State<Arc<App>>,
    Owner(_owner): Owner,
    Json(input): Json<PreviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let preview = app.websites.preview(&input.url).await?;
    Ok(Json(preview))
}

async fn get_website(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let website = with_conn(&app, |conn| Ok(WebsiteManager::new(conn, &owner).get_website(&id)?))?;
    Ok(Json(website))
}

async fn update_website(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
    Json(update): Json<WebsiteUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let website = with_conn(&app, |conn| {
        Ok(WebsiteManager::new(conn, &owner).update_website(&id, &update)?)
    })?;
    Ok(Json(website))
}

async fn delete_website(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    with_conn(&app, |conn| Ok(WebsiteManager::new(conn, &owner).delete_website(&id)?))?;
    Ok(Json(json!({ "message": "Website deleted successfully" })))
}

async fn record_view(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let website = with_conn(&app, |conn| Ok(WebsiteManager::new(conn, &owner).record_view(&id)?))?;
    Ok(Json(website))
}

// === Tags ===

#[derive(Debug, Deserialize)]
struct TagQuery {
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewTag {
    #[serde(default)]
    name: String,
    color: Option<String>,
}

async fn list_tags(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Query(query): Query<TagQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let tags = with_conn(&app, |conn| {
        Ok(TagManager::new(conn, &owner).list_tags(query.search.as_deref())?)
    })?;
    Ok(Json(tags))
}

async fn create_tag(
    State(app): State<Arc<App>>,
    Owner(owner): Owner,
    Json(input): Json<NewTag>,
) -> Result<impl IntoResponse, ApiError> {
    let color = input.color.as_deref().unwrap_or(DEFAULT_TAG_COLOR);
    let tag = with_conn(&app, |conn| {
        Ok(TagManager::new(conn, &owner).record_usage(&input.name, Some(color))?)
    })?;
    Ok(Json(tag))
}

// === Reminders ===

async fn send_reminders(
    State(app): State<Arc<App>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    app.reminders.authorize(authorization)?;

    let report = app.reminders.send_due(Utc::now()).await?;
    info!(sent = report.emails_sent, errors = report.errors, "reminders processed");
    Ok(Json(report))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(app: &App) -> CorsLayer {
    let origins: Vec<HeaderValue> = app
        .settings
        .server
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    let mut headers = vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];
    if let Ok(identity) = HeaderName::from_bytes(app.settings.auth.identity_header.as_bytes()) {
        headers.push(identity);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(headers)
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Builds the full router: the JSON API under `/api` plus `/health`.
pub fn router(app: Arc<App>) -> Router {
    let api = Router::new()
        .route("/folders", get(list_folders).post(create_folder))
        .route("/folders/tree", get(folder_tree))
        .route(
            "/folders/:id",
            get(get_folder).put(update_folder).delete(delete_folder),
        )
        .route("/folders/:id/breadcrumb", get(folder_breadcrumb))
        .route("/websites", get(list_websites).post(create_website))
        .route("/websites/replace", post(replace_website))
        .route("/websites/preview", post(preview_website))
        .route(
            "/websites/:id",
            get(get_website).put(update_website).delete(delete_website),
        )
        .route("/websites/:id/view", post(record_view))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/reminders/send", post(send_reminders));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&app))
        .with_state(app)
}
