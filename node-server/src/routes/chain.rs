use axum::extract::State;
use axum::Json;

use chain::ChainWire;

use crate::state::SharedState;

/// `GET /chain`
pub async fn get_chain(State(state): State<SharedState>) -> Json<ChainWire> {
    Json(ChainWire {
        chain: state.chain_snapshot().await,
    })
}
