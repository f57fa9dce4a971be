use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{FromRef, State},
    http::{StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::cell::Cell;
use crate::config;
use crate::downloader;
use crate::google::GoogleSheetsClient;
use crate::login::{self, CurrentUser, SessionStore};
use crate::record::Record;
use crate::sheets::{Connected, SheetAdapter, SheetStore};
use crate::table::Table;

/// Shared state handed to every handler
///
/// Built once at startup; the sheet client inside is the only connection
/// to the backing store for the life of the process.
pub struct AppState<S> {
    pub sessions: Arc<SessionStore>,
    pub sheets: Arc<SheetAdapter<S>>,
}

impl<S: SheetStore> AppState<S> {
    pub fn new(store: S) -> Self {
        AppState {
            sessions: Arc::new(SessionStore::new()),
            sheets: Arc::new(SheetAdapter::new(store)),
        }
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        AppState {
            sessions: Arc::clone(&self.sessions),
            sheets: Arc::clone(&self.sheets),
        }
    }
}

impl<S> FromRef<AppState<S>> for Arc<SessionStore> {
    fn from_ref(state: &AppState<S>) -> Self {
        Arc::clone(&state.sessions)
    }
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// Pre-filled add-record form
    pub draft: Record,
    /// Read failure shown above the (then empty) table
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveAllRequest {
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    pub message: Option<String>,
}

impl SaveResponse {
    fn ok(message: String) -> Json<SaveResponse> {
        Json(SaveResponse {
            status: "ok".to_string(),
            message: Some(message),
        })
    }

    fn error(code: StatusCode, message: String) -> Response {
        error!("{}", message);
        (
            code,
            Json(SaveResponse {
                status: "error".to_string(),
                message: Some(message),
            }),
        )
            .into_response()
    }
}

/// Build the router
///
/// Everything except the login and logout endpoints sits behind
/// [`login::require_auth`].
pub fn router<S: SheetStore>(state: AppState<S>) -> Router {
    let protected = Router::new()
        .route("/", get(serve_tracker))
        .route(
            "/api/records",
            get(list_records::<S>)
                .post(add_record::<S>)
                .put(save_all::<S>),
        )
        .route("/api/export/csv", get(export_csv::<S>))
        .route("/api/export/xlsx", get(export_xlsx::<S>))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.sessions),
            login::require_auth,
        ));

    Router::new()
        .route(
            "/login",
            get(login::serve_login_page).post(login::handle_login),
        )
        .route("/logout", post(login::handle_logout))
        .merge(protected)
        .with_state(state)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // A failed connection is kept and shown on the page instead of stopping
    // the server.
    let client = GoogleSheetsClient::connect();
    if let Err(e) = &client {
        error!("Sheet connection failed: {}", e);
    }
    let app = router(AppState::new(Connected::new(client)));

    let listener = TcpListener::bind(config::BIND_ADDR).await?;
    info!("Listening on http://{}", config::BIND_ADDR);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Tracker page with the logged-in username injected
async fn serve_tracker(Extension(user): Extension<CurrentUser>) -> Html<String> {
    let template = include_str!("./static/tracker.html");
    let user_json = serde_json::to_string(&user.0).unwrap_or_else(|_| "\"\"".to_string());
    Html(template.replace(
        "</head>",
        &format!(
            "    <script>const CURRENT_USER = {};</script>\n</head>",
            user_json
        ),
    ))
}

async fn list_records<S: SheetStore>(State(state): State<AppState<S>>) -> Json<RecordsResponse> {
    let (table, error) = match state.sheets.read_all().await {
        Ok(table) => (table, None),
        Err(e) => {
            let message = format!("读取数据失败: {}", e);
            error!("{}", message);
            (Table::empty(), Some(message))
        }
    };

    Json(RecordsResponse {
        draft: Record::draft(table.next_serial()),
        columns: table.columns,
        rows: table.rows,
        error,
    })
}

async fn add_record<S: SheetStore>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<CurrentUser>,
    Json(record): Json<Record>,
) -> Response {
    if let Err(e) = record.check() {
        return SaveResponse::error(StatusCode::BAD_REQUEST, format!("保存失败: {}", e));
    }

    match state.sheets.append(&record).await {
        Ok(()) => {
            info!("'{}' added record {}", user.0, record.serial);
            SaveResponse::ok(format!("✅ 成功添加：{}", record.name)).into_response()
        }
        Err(e) => SaveResponse::error(StatusCode::INTERNAL_SERVER_ERROR, format!("保存失败: {}", e)),
    }
}

/// Save-all from the grid editor: normalize, sort by serial, overwrite
async fn save_all<S: SheetStore>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<SaveAllRequest>,
) -> Response {
    let table = Table::from_rows(request.rows).normalize().sort_by_serial();

    match state.sheets.overwrite(&table).await {
        Ok(()) => {
            info!("'{}' saved {} rows", user.0, table.len());
            SaveResponse::ok("✅ 已同步！".to_string()).into_response()
        }
        Err(e) => SaveResponse::error(StatusCode::INTERNAL_SERVER_ERROR, format!("同步失败: {}", e)),
    }
}

async fn export_csv<S: SheetStore>(State(state): State<AppState<S>>) -> Response {
    export(state, "csv", "text/csv; charset=utf-8", downloader::to_csv).await
}

async fn export_xlsx<S: SheetStore>(State(state): State<AppState<S>>) -> Response {
    export(
        state,
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        downloader::to_xlsx,
    )
    .await
}

async fn export<S: SheetStore>(
    state: AppState<S>,
    extension: &str,
    content_type: &'static str,
    convert: fn(&Table) -> Result<Vec<u8>, Box<dyn std::error::Error>>,
) -> Response {
    let table = match state.sheets.read_all().await {
        Ok(table) => table,
        Err(e) => {
            return SaveResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("读取数据失败: {}", e),
            );
        }
    };

    let bytes = match convert(&table) {
        Ok(bytes) => bytes,
        Err(e) => {
            return SaveResponse::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("导出失败: {}", e),
            );
        }
    };

    let filename = format!(
        "records-{}.{}",
        Local::now().format("%Y%m%d-%H%M%S"),
        extension
    );
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(bytes),
    )
        .into_response()
}
