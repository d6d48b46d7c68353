use std::convert::Infallible;
use std::sync::Arc;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::{header, request::Parts, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use tokio::net;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use crate::adapters::render::Templates;
use crate::config::AppConfig;
use crate::core::{Outcome, TodoError, TodoForm};
use crate::storage::sqlite::{SqliteSession, SqliteStorage};
use crate::storage::TodoStore;

#[derive(Clone)]
pub struct AppState {
    pub storage: SqliteStorage,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(storage: SqliteStorage, templates: Templates) -> Self {
        Self {
            storage,
            templates: Arc::new(templates),
        }
    }
}

// Every handler gets its own session; the connection is released when the
// handler returns, whatever the result.
impl FromRequestParts<AppState> for SqliteSession {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(state.storage.session())
    }
}

/// Form body that falls back to an empty form when the body can't be read as
/// urlencoded (wrong or missing content type), so the route still redirects.
pub struct TodoFormBody(pub TodoForm);

impl<S: Send + Sync> FromRequest<S> for TodoFormBody {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<TodoForm>::from_request(req, state).await {
            Ok(Form(form)) => Ok(Self(form)),
            Err(rejection) => {
                debug!(%rejection, "Unreadable form, treating it as empty");
                Ok(Self(TodoForm::default()))
            }
        }
    }
}

fn to_listing() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

fn log_skip<T>(action: &str, id: Option<i64>, outcome: &Outcome<T>) {
    if let Outcome::Skipped(reason) = outcome {
        debug!(action, ?id, ?reason, "Nothing written");
    }
}

async fn index(State(state): State<AppState>, mut db: SqliteSession) -> Result<Html<String>, TodoError> {
    let todos = db.list().await?;
    Ok(Html(state.templates.index(&todos)?))
}

async fn add(mut db: SqliteSession, TodoFormBody(form): TodoFormBody) -> Result<Response, TodoError> {
    let (title, description) = form.trimmed();
    let outcome = db.insert(title, description).await?;
    log_skip("add", None, &outcome);
    Ok(to_listing())
}

async fn edit_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut db: SqliteSession,
) -> Result<Response, TodoError> {
    match db.get_by_id(id).await? {
        Some(todo) => Ok(Html(state.templates.edit(&todo)?).into_response()),
        None => {
            debug!(id, "Edit requested for unknown todo");
            Ok(to_listing())
        }
    }
}

async fn edit(
    Path(id): Path<i64>,
    mut db: SqliteSession,
    TodoFormBody(form): TodoFormBody,
) -> Result<Response, TodoError> {
    let (title, description) = form.trimmed();
    let outcome = db.update(id, title, description).await?;
    log_skip("edit", Some(id), &outcome);
    Ok(to_listing())
}

async fn toggle(Path(id): Path<i64>, mut db: SqliteSession) -> Result<Response, TodoError> {
    let outcome = db.toggle(id).await?;
    log_skip("toggle", Some(id), &outcome);
    Ok(to_listing())
}

async fn delete(Path(id): Path<i64>, mut db: SqliteSession) -> Result<Response, TodoError> {
    let outcome = db.delete(id).await?;
    log_skip("delete", Some(id), &outcome);
    Ok(to_listing())
}

async fn health_route() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request<_>| {
        let uri = request.uri().to_string();
        tracing::info_span!("http_request", method = ?request.method(), uri)
    });

    Router::new()
        .route("/", get(index))
        .route("/add", post(add))
        .route("/edit/{id}", get(edit_page).post(edit))
        .route("/toggle/{id}", post(toggle))
        .route("/delete/{id}", post(delete))
        .route("/health", get(health_route))
        .layer(trace_layer)
        .with_state(state)
}

pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    pub async fn new(state: AppState, config: &AppConfig) -> Result<Self, TodoError> {
        let addr = config.addr();
        let listener = net::TcpListener::bind(&addr).await.inspect_err(|e| {
            tracing::error!(addr = %addr, error = %e, "Failed to listen");
        })?;
        Ok(Self {
            router: router(state),
            listener,
        })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr, TodoError> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> Result<(), TodoError> {
        info!(addr = %self.local_addr()?, "Todo server listening");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Todo server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
