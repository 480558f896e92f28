use axum::extract::State;
use axum::Json;

use chain::StatusWire;

use crate::state::SharedState;

/// `PUT /consensus`: run longest-chain resolution against every known
/// peer. Peers call this with an empty body.
pub async fn run_consensus(State(state): State<SharedState>) -> Json<StatusWire> {
    if state.resolve_conflicts().await {
        Json(StatusWire::success())
    } else {
        Json(StatusWire::fail())
    }
}
