//! HTTP server for the B-tree engine.
//!
//! Provides REST API endpoints for:
//! - Insert, search and delete on integer keys
//! - Tree visualization export
//! - Resetting the tree with a new minimum degree

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use btree_mem::{BTree, BTreeConfig, BTreeError, TreeNode, TreeStats};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

/// Request to reset the tree
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetRequest {
    min_degree: Option<usize>,
}

/// Request to insert a key
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertRequest {
    key: i64,
}

/// Response for search operations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    key: i64,
    found: bool,
}

/// Response for operations that return success/failure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    success: bool,
    message: String,
}

/// Tree visualization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeResponse {
    tree: Option<TreeNode>,
    stats: TreeStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkInsertRequest {
    keys: Vec<i64>,
}

type ApiError = (StatusCode, Json<OperationResponse>);

/// Tree shared across handlers
struct AppState {
    tree: RwLock<BTree<i64>>,
}

impl AppState {
    fn new() -> Self {
        Self {
            tree: RwLock::new(BTree::default()),
        }
    }
}

type SharedState = Arc<AppState>;

fn error_response(status: StatusCode, message: String) -> ApiError {
    (
        status,
        Json(OperationResponse {
            success: false,
            message,
        }),
    )
}

#[tokio::main]
async fn main() {
    init_tracing();
    let state = Arc::new(AppState::new());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/tree", post(reset_tree).get(get_tree))
        .route("/api/config", get(get_config))
        .route("/api/keys", get(list_keys).post(insert_key))
        .route("/api/keys/:key", get(search_key).delete(delete_key))
        .route("/api/stats", get(get_stats))
        .route("/api/clear", post(clear_tree))
        .route("/api/bulk", post(bulk_insert))
        .layer(cors)
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind("0.0.0.0:3001").await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("ERROR: Failed to bind: {}", e);
            std::process::exit(1);
        }
    };
    println!("B-tree server running on http://localhost:3001");
    println!("API Endpoints:");
    println!("  POST   /api/tree      - Reset the tree (optional minDegree)");
    println!("  GET    /api/tree      - Get tree structure for visualization");
    println!("  GET    /api/config    - Get B-tree config");
    println!("  GET    /api/keys      - List all keys in order");
    println!("  POST   /api/keys      - Insert a key");
    println!("  GET    /api/keys/:key - Search for a key");
    println!("  DELETE /api/keys/:key - Delete a key");
    println!("  GET    /api/stats     - Get tree stats");
    println!("  POST   /api/clear     - Remove all keys");
    println!("  POST   /api/bulk      - Bulk insert keys");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("ERROR: Server failed: {}", e);
        std::process::exit(1);
    }
}

/// Route library events to stderr, filtered by `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

async fn reset_tree(
    State(state): State<SharedState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let min_degree = req.min_degree.unwrap_or(state.tree.read().min_degree());

    match BTree::new(min_degree) {
        Ok(tree) => {
            *state.tree.write() = tree;
            Ok(Json(OperationResponse {
                success: true,
                message: format!("Tree reset with minimum degree {}", min_degree),
            }))
        }
        Err(e) => Err(error_response(StatusCode::BAD_REQUEST, e.to_string())),
    }
}

async fn get_config(State(state): State<SharedState>) -> Json<BTreeConfig> {
    Json(state.tree.read().config())
}

async fn list_keys(State(state): State<SharedState>) -> Json<Vec<i64>> {
    let tree = state.tree.read();
    Json(tree.traverse().copied().collect())
}

async fn insert_key(
    State(state): State<SharedState>,
    Json(req): Json<InsertRequest>,
) -> Json<OperationResponse> {
    let inserted = state.tree.write().insert(req.key);
    Json(OperationResponse {
        success: true,
        message: if inserted {
            format!("Inserted key {}", req.key)
        } else {
            format!("Key {} already present", req.key)
        },
    })
}

async fn search_key(
    State(state): State<SharedState>,
    Path(key): Path<i64>,
) -> Json<SearchResponse> {
    let found = state.tree.read().search(&key);
    Json(SearchResponse { key, found })
}

async fn delete_key(
    State(state): State<SharedState>,
    Path(key): Path<i64>,
) -> Result<Json<OperationResponse>, ApiError> {
    let result = state.tree.write().delete(&key);
    match result {
        Ok(_) => Ok(Json(OperationResponse {
            success: true,
            message: format!("Deleted key {}", key),
        })),
        Err(BTreeError::KeyNotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Key {} not found", key),
        )),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Delete failed: {}", e),
        )),
    }
}

async fn get_tree(State(state): State<SharedState>) -> Json<TreeResponse> {
    let tree = state.tree.read();
    Json(TreeResponse {
        tree: tree.export_tree(),
        stats: tree.stats(),
    })
}

async fn get_stats(State(state): State<SharedState>) -> Json<TreeStats> {
    Json(state.tree.read().stats())
}

async fn clear_tree(State(state): State<SharedState>) -> Json<OperationResponse> {
    state.tree.write().clear();
    Json(OperationResponse {
        success: true,
        message: "Tree cleared".to_string(),
    })
}

async fn bulk_insert(
    State(state): State<SharedState>,
    Json(req): Json<BulkInsertRequest>,
) -> Json<OperationResponse> {
    let mut tree = state.tree.write();
    let inserted = req.keys.into_iter().filter(|&key| tree.insert(key)).count();
    Json(OperationResponse {
        success: true,
        message: format!("Inserted {} keys", inserted),
    })
}
