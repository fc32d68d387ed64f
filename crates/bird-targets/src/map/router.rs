use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::export::{
    dossier_file_name, is_valid_species_code, read_targets, Layer, DOSSIERS_DIR, LAYERS_DIR,
    TARGETS_CSV_FILE,
};

const INDEX_HTML: &str = include_str!("index.html");

/// Read-only view over an export directory.
#[derive(Debug, Clone)]
pub struct MapArtifacts {
    out_dir: PathBuf,
}

impl MapArtifacts {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn layer_path(&self, layer: Layer) -> PathBuf {
        self.out_dir.join(LAYERS_DIR).join(layer.file_name())
    }

    pub fn targets_path(&self) -> PathBuf {
        self.out_dir.join(TARGETS_CSV_FILE)
    }

    pub fn dossier_path(&self, species_code: &str) -> PathBuf {
        self.out_dir
            .join(DOSSIERS_DIR)
            .join(dossier_file_name(species_code))
    }
}

/// Router serving the map page, exported layers, ranked targets and dossiers from `out_dir`.
pub fn map_router(out_dir: impl Into<PathBuf>) -> Router {
    let artifacts = Arc::new(MapArtifacts::new(out_dir));

    Router::new()
        .route("/", get(index_handler))
        .route("/layers", get(layers_handler))
        .route("/layers/:name", get(layer_handler))
        .route("/targets", get(targets_handler))
        .route("/dossiers/:code", get(dossier_handler))
        .fallback(not_found_handler)
        .with_state(artifacts)
}

fn json_response<T: Serialize>(status: StatusCode, payload: T) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(payload),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    json_response(status, json!({ "error": message }))
}

fn internal_error(context: &str, err: impl std::fmt::Display) -> Response {
    warn!(error = %err, "{context}");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, context)
}

pub(crate) async fn index_handler() -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        INDEX_HTML,
    )
        .into_response()
}

pub(crate) async fn layers_handler() -> Response {
    let names: Vec<&str> = Layer::ALL.iter().map(|layer| layer.name()).collect();
    json_response(StatusCode::OK, names)
}

pub(crate) async fn layer_handler(
    State(artifacts): State<Arc<MapArtifacts>>,
    Path(name): Path<String>,
) -> Response {
    let Some(layer) = Layer::from_name(&name) else {
        return error_response(StatusCode::NOT_FOUND, "Unknown layer");
    };

    match tokio::fs::read(artifacts.layer_path(layer)).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            bytes,
        )
            .into_response(),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            error_response(StatusCode::NOT_FOUND, "Layer file not found")
        }
        Err(err) => internal_error("failed to read layer", err),
    }
}

pub(crate) async fn targets_handler(State(artifacts): State<Arc<MapArtifacts>>) -> Response {
    let bytes = match tokio::fs::read(artifacts.targets_path()).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return json_response(StatusCode::OK, Vec::<Value>::new());
        }
        Err(err) => return internal_error("failed to read targets", err),
    };

    match read_targets(bytes.as_slice()) {
        Ok(scores) => json_response(StatusCode::OK, scores),
        Err(err) => internal_error("invalid targets file", err),
    }
}

pub(crate) async fn dossier_handler(
    State(artifacts): State<Arc<MapArtifacts>>,
    Path(code): Path<String>,
) -> Response {
    let not_found = (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Dossier not found",
    );
    if !is_valid_species_code(&code) {
        return not_found.into_response();
    }

    match tokio::fs::read_to_string(artifacts.dossier_path(&code)).await {
        Ok(markdown) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            markdown,
        )
            .into_response(),
        Err(err) if err.kind() == ErrorKind::NotFound => not_found.into_response(),
        Err(err) => internal_error("failed to read dossier", err),
    }
}

pub(crate) async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}
