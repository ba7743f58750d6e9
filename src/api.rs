// 🌐 HTTP API - page, JSON endpoints, import/export
//
// Every handler: load → (mutate → save) → aggregate → respond.
// Nothing is held between requests except the store handle; concurrent
// writers are not serialized and the last save wins.

use crate::aggregate::{compute, Balances};
use crate::error::LedgerError;
use crate::movement::{Movement, NewMovement};
use crate::page::render_index;
use crate::store::LedgerStore;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Name offered to the browser for `GET /exportar`
pub const EXPORT_FILE_NAME: &str = "contabilidad_casa.json";

pub const IMPORT_OK_MESSAGE: &str = "Datos importados correctamente";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<LedgerStore>,
}

impl AppState {
    pub fn new(store: LedgerStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Ordered movements plus balances, the body of every JSON success
#[derive(Debug, Serialize)]
pub struct LedgerView {
    pub movimientos: Vec<Movement>,
    pub saldos: Balances,
}

impl From<Vec<Movement>> for LedgerView {
    fn from(records: Vec<Movement>) -> Self {
        let (movimientos, saldos) = compute(records);
        Self { movimientos, saldos }
    }
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    #[serde(flatten)]
    pub view: LedgerView,
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = match &self {
            LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::BadUpload(_) | LedgerError::CorruptInput(_) => StatusCode::BAD_REQUEST,
            LedgerError::Io(_) | LedgerError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if self.is_client_error() {
            tracing::info!(status = status.as_u16(), error = %self, "request rejected");
        } else {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }

        json_error(status, self.code(), self.to_string())
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET / - Rendered ledger page
async fn index(State(state): State<AppState>) -> Result<Html<String>, LedgerError> {
    let view = LedgerView::from(state.store.load()?);
    Ok(Html(render_index(&view.movimientos, &view.saldos)))
}

/// GET /api/movimientos - Same data as the page, as JSON
async fn list_movements(State(state): State<AppState>) -> Result<Json<LedgerView>, LedgerError> {
    Ok(Json(LedgerView::from(state.store.load()?)))
}

/// POST /guardar - Create a movement
async fn save_movement(
    State(state): State<AppState>,
    payload: Result<Json<NewMovement>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return json_error(rejection.status(), "validation_error", rejection.body_text());
        }
    };

    match state.store.create(request) {
        Ok((movement, records)) => {
            tracing::info!(id = %movement.id, tipo = %movement.tipo, cantidad = movement.cantidad, "movement saved");
            Json(LedgerView::from(records)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// DELETE /eliminar/:id - Remove a movement by id
async fn delete_movement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LedgerView>, LedgerError> {
    let records = state.store.delete(&id)?;
    tracing::info!(id = %id, "movement deleted");
    Ok(Json(LedgerView::from(records)))
}

/// GET /exportar - Download the backing file as is
async fn export_ledger(State(state): State<AppState>) -> Result<Response, LedgerError> {
    let bytes = state.store.export()?;
    tracing::info!(bytes = bytes.len(), "ledger exported");

    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        EXPORT_FILE_NAME,
        urlencoding::encode(EXPORT_FILE_NAME)
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// POST /importar - Replace the ledger with an uploaded .json file
async fn import_ledger(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportResponse>, LedgerError> {
    let mut multipart =
        multipart.map_err(|rejection| LedgerError::BadUpload(rejection.body_text()))?;

    let (file_name, bytes) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| LedgerError::BadUpload(e.body_text()))?
            .ok_or_else(|| LedgerError::BadUpload("No se ha enviado ningún archivo".to_string()))?;

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| LedgerError::BadUpload(e.body_text()))?;
        break (file_name, bytes);
    };

    if !has_json_extension(&file_name) {
        return Err(LedgerError::BadUpload(
            "El archivo debe tener extensión .json".to_string(),
        ));
    }

    let records = state.store.import(&bytes)?;
    tracing::info!(file = %file_name, count = records.len(), "ledger replaced from upload");

    Ok(Json(ImportResponse {
        message: IMPORT_OK_MESSAGE.to_string(),
        view: LedgerView::from(records),
    }))
}

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

fn has_json_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

// ============================================================================
// ROUTER
// ============================================================================

/// Full application router over `store`, serving `static_dir` under /static
pub fn build_router(store: LedgerStore, static_dir: impl AsRef<std::path::Path>) -> Router {
    let state = AppState::new(store);

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/movimientos", get(list_movements));

    Router::new()
        .route("/", get(index))
        .route("/guardar", post(save_movement))
        .route("/eliminar/:id", delete(delete_movement))
        .route("/exportar", get(export_ledger))
        .route("/importar", post(import_ledger))
        .nest("/api", api_routes)
        .with_state(state)
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
