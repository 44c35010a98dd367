// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Proof server
//!
//! Routes of the backend called by the wallet front end:
//!
//! - `GET /health`: Always `200`.
//! - `GET /ready`: `200` when idle, `409` while other requests are being handled.
//! - `GET /root`: The root of the served tree.
//! - `GET /proof/:address`: The proof of an address, `404` if it is not allow-listed and `400` if
//!   it is malformed.
//! - `POST /verify`: Checks a proof, against the served root unless another one is given.

use crate::service::ProofService;
use crate::types::{RootResponse, VerifyRequest, VerifyResponse};
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use supply_chain_core::merkle::error::MerkleError;
use tokio::net::TcpListener;

#[derive(Clone)]
struct ServerState {
    service: Arc<ProofService>,
    active_requests: Arc<AtomicUsize>,
}

/// Builds the routes of the proof server over a loaded service.
pub fn router(service: Arc<ProofService>) -> Router {
    let state = ServerState {
        service,
        active_requests: Arc::new(AtomicUsize::new(0)),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/root", get(root))
        .route("/proof/:address", get(proof))
        .route("/verify", post(verify))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            count_requests_middleware,
        ))
        .with_state(state)
}

/// Serves the proof server on an already bound listener, until the process stops.
pub async fn serve(listener: TcpListener, service: Arc<ProofService>) -> std::io::Result<()> {
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, router(service)).await
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn ready_check(State(state): State<ServerState>) -> impl IntoResponse {
    let active_requests = state.active_requests.load(Ordering::SeqCst);
    if active_requests > 0 {
        StatusCode::CONFLICT
    } else {
        StatusCode::OK
    }
}

async fn root(State(state): State<ServerState>) -> impl IntoResponse {
    Json(RootResponse::new(state.service.root()))
}

async fn proof(
    State(state): State<ServerState>,
    Path(address): Path<String>,
) -> Result<impl IntoResponse, StatusCode> {
    match state.service.prove_address(&address) {
        Ok(Some(proof)) => Ok(Json(proof)),
        Ok(None) => {
            info!("Address {address} is not allow-listed");
            Err(StatusCode::NOT_FOUND)
        }
        Err(err) => Err(error_status(&err)),
    }
}

async fn verify(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<impl IntoResponse, StatusCode> {
    let request: VerifyRequest = serde_json::from_slice(&body).map_err(|err| {
        error!("Failed to deserialize request object: {err}");
        StatusCode::BAD_REQUEST
    })?;

    let valid = state
        .service
        .verify(*request.root(), request.value(), request.proof())
        .map_err(|err| error_status(&err))?;

    Ok(Json(VerifyResponse::new(valid)))
}

fn error_status(err: &MerkleError) -> StatusCode {
    match err {
        MerkleError::LeafEncoding { .. } | MerkleError::Validation { .. } => {
            error!("Invalid leaf in request: {err}");
            StatusCode::BAD_REQUEST
        }
        _ => {
            error!("Could not handle request: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn count_requests_middleware(
    State(state): State<ServerState>,
    req: axum::http::Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, StatusCode> {
    let is_ready = req.uri().path() != "/ready";
    if is_ready {
        state.active_requests.fetch_add(1, Ordering::SeqCst);
    }

    let response = next.run(req).await;

    if is_ready {
        state.active_requests.fetch_sub(1, Ordering::SeqCst);
    }

    Ok(response)
}
