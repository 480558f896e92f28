use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use chain::{NodeScheduler, StatusWire};

use crate::state::SharedState;

/// `GET /mine`: trigger exactly one mining round, synchronously.
pub async fn mine_once(State(state): State<SharedState>) -> Json<StatusWire> {
    state.mine_once().await;
    Json(StatusWire::success())
}

/// `GET /mine/start`: begin (or re-begin) the periodic mining timer.
pub async fn start_mining(State(state): State<SharedState>) -> Json<StatusWire> {
    let scheduler: Arc<NodeScheduler> = state;
    scheduler.spawn_mining_timer();
    Json(StatusWire::success())
}
