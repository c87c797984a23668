use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{LedgerError, LedgerService, MineOutcome, PeerChain};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LedgerService>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
struct TxIn {
    sender: String,
    receiver: String,
    amount: f64,
}

#[derive(Deserialize)]
struct ConnectIn {
    #[serde(default)]
    nodes: Vec<String>,
}

pub enum ApiError {
    BadRequest(String),
    Ledger(LedgerError),
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Ledger(
                err @ (LedgerError::InvalidAddress(_) | LedgerError::NonFiniteAmount(_)),
            ) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Ledger(err) => {
                warn!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/get_chain", get(get_chain))
        .route("/mine_block", get(mine_block))
        .route("/add_transaction", post(add_transaction))
        .route("/connect_node", post(connect_node))
        .route("/replace_chain", get(replace_chain))
        .route("/is_valid", get(is_valid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_chain(State(state): State<AppState>) -> Json<PeerChain> {
    let chain = state.service.chain_snapshot().await;
    Json(PeerChain {
        length: chain.len() as u64,
        chain,
    })
}

async fn mine_block(State(state): State<AppState>) -> Result<Response, ApiError> {
    let response = match state.service.mine().await? {
        MineOutcome::Mined(block) => (
            StatusCode::OK,
            Json(json!({
                "message": "Congratulations, you just mined a block!",
                "index": block.index,
                "timestamp": block.timestamp,
                "proof": block.proof,
                "previous_hash": block.previous_hash,
                "transactions": block.transactions,
            })),
        )
            .into_response(),
        MineOutcome::Stale => (
            StatusCode::CONFLICT,
            Json(json!({
                "message": "The chain moved on before a proof was found, try again.",
            })),
        )
            .into_response(),
    };
    Ok(response)
}

async fn add_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TxIn>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(tx) = payload?;
    let index = state
        .service
        .add_transaction(tx.sender, tx.receiver, tx.amount)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!("This transaction will be added to Block {index}"),
            "index": index,
        })),
    ))
}

async fn connect_node(
    State(state): State<AppState>,
    payload: Result<Json<ConnectIn>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = payload?;
    if body.nodes.is_empty() {
        return Err(ApiError::BadRequest("No node".into()));
    }
    state.service.add_nodes(&body.nodes).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "All the nodes are now connected.",
            "total_nodes": state.service.nodes().await,
        })),
    ))
}

async fn replace_chain(State(state): State<AppState>) -> impl IntoResponse {
    let replaced = state.service.reconcile().await;
    let message = if replaced {
        "The node had different chains so the chain was replaced by the longest one."
    } else {
        "All good. The chain is the largest one."
    };
    Json(json!({
        "message": message,
        "replaced": replaced,
        "chain": state.service.chain_snapshot().await,
    }))
}

async fn is_valid(State(state): State<AppState>) -> impl IntoResponse {
    let valid = state.service.is_chain_valid().await;
    let message = if valid {
        "All good. The Blockchain is valid."
    } else {
        "We have a problem. The Blockchain is not valid."
    };
    Json(json!({ "message": message, "valid": valid }))
}
