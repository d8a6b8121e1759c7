//! HTTP routes used by the web front-end.
//!
//! - `GET  /GetStatus`      : presence ping + emulator link status (JSON)
//! - `POST /input/{token}`  : one button transition, e.g. `D_GBA_A`
//!
//! Both read the opaque `client-id` header. It only feeds presence
//! counting and logs; there is no authentication.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{debug, info, warn};

use crowdpad_core::{Direction, Rejected};
use crowdpad_protocol::token;

use crate::types::SharedController;

/// Header carrying the browser's client id.
pub const CLIENT_ID_HEADER: &str = "client-id";

pub const ACCEPTED_BODY: &str = "VALID KEYPRESS";
pub const REJECTED_BODY: &str = "INVALID KEYPRESS, DROPPING";

/// Characters of the client id shown in logs.
const PLAYER_TAG_LEN: usize = 6;

#[derive(Clone)]
pub struct AppState {
    pub controller: SharedController,
}

/// Body of `GET /GetStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBody {
    pub sock_connected: bool,
    pub players_connected: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/GetStatus", get(get_status))
        .route("/input/{token}", post(submit_input))
        .with_state(state)
}

pub async fn get_status(State(state): State<AppState>, headers: HeaderMap) -> Json<StatusBody> {
    let client_id = client_id(&headers);
    let status = state.controller.get_status(client_id);
    Json(StatusBody {
        sock_connected: status.connected,
        players_connected: status.player_count,
    })
}

pub async fn submit_input(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, &'static str) {
    let player = player_tag(client_id(&headers));

    let outcome = token::split_token(&raw)
        .map_err(Rejected::from)
        .and_then(|(direction, name)| {
            state
                .controller
                .submit_button_event(direction, name)
                .map(|snapshot| (direction, name, snapshot))
        });

    match outcome {
        Ok((direction, name, snapshot)) => {
            debug!(%player, %direction, button = name, input = %snapshot, "input applied");
            if direction == Direction::Press {
                info!(%player, button = name, "press");
            }
            (StatusCode::OK, ACCEPTED_BODY)
        }
        Err(rejected) => {
            warn!(%player, token = %raw, reason = %rejected, "invalid keypress, dropping");
            (StatusCode::BAD_REQUEST, REJECTED_BODY)
        }
    }
}

/// `client-id` header value, or `""` when absent or not valid text.
fn client_id(headers: &HeaderMap) -> &str {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// First few characters of the client id, padded, for log lines.
pub fn player_tag(client_id: &str) -> String {
    let tag: String = client_id.chars().take(PLAYER_TAG_LEN).collect();
    format!("{:<width$}", tag, width = PLAYER_TAG_LEN)
}
