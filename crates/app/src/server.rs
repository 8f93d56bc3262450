//! HTTP server
//!
//! Serves the four HTML views plus a small JSON API over the same context.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use beasiswa_classifier::{ModelMetadata, Prediction};
use beasiswa_dataset::ApplicantFeatures;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::context::SharedContext;
use crate::views::{self, FormOutcome};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unprocessable<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    rows: usize,
    accuracy: f64,
}

#[derive(Debug, Serialize)]
struct ModelResponse {
    accuracy: f64,
    classes: Vec<String>,
    metadata: ModelMetadata,
}

pub async fn start_server(ctx: SharedContext, addr: &str) -> Result<()> {
    let app = build_router(ctx);
    let listener = bind_listener(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    info!("Shutdown signal received");
}

pub fn build_router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/", get(handle_description))
        .route("/data", get(handle_data))
        .route(
            "/prediksi",
            get(handle_prediction_form).post(handle_prediction_submit),
        )
        .route("/tentang", get(handle_about))
        .route("/api/health", get(handle_health))
        .route("/api/model", get(handle_model))
        .route("/api/predict", post(handle_api_predict))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn handle_description(State(ctx): State<SharedContext>) -> Html<String> {
    Html(views::description(&ctx))
}

async fn handle_data(State(ctx): State<SharedContext>) -> Html<String> {
    Html(views::data(&ctx))
}

async fn handle_prediction_form() -> Html<String> {
    Html(views::prediction(&ApplicantFeatures::form_default(), None))
}

async fn handle_prediction_submit(
    State(ctx): State<SharedContext>,
    Form(input): Form<ApplicantFeatures>,
) -> Response {
    if let Err(message) = input.validate_ranges() {
        warn!("Rejected prediction form: {}", message);
        let page = views::prediction(&input, Some(&FormOutcome::Rejected(message)));
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
    }

    match ctx.predict(&input) {
        Ok(prediction) => {
            let page = views::prediction(&input, Some(&FormOutcome::Predicted(prediction)));
            Html(page).into_response()
        }
        Err(err) => ApiError::internal(format!("prediction failed: {err}")).into_response(),
    }
}

async fn handle_about() -> Html<String> {
    Html(views::about())
}

async fn handle_health(State(ctx): State<SharedContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        rows: ctx.dataset().row_count(),
        accuracy: ctx.model().accuracy,
    })
}

async fn handle_model(State(ctx): State<SharedContext>) -> Json<ModelResponse> {
    let model = ctx.model();
    Json(ModelResponse {
        accuracy: model.accuracy,
        classes: model.pipeline.classes().to_vec(),
        metadata: model.metadata.clone(),
    })
}

async fn handle_api_predict(
    State(ctx): State<SharedContext>,
    Json(input): Json<ApplicantFeatures>,
) -> Result<Json<Prediction>, ApiError> {
    input.validate_ranges().map_err(ApiError::unprocessable)?;
    let prediction = ctx
        .predict(&input)
        .map_err(|err| ApiError::internal(format!("prediction failed: {err}")))?;
    Ok(Json(prediction))
}
