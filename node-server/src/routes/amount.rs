use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use chain::AmountWire;

use crate::state::SharedState;

#[derive(Deserialize)]
pub struct AmountQuery {
    pub blockchain_address: String,
}

/// `GET /amount?blockchain_address=A`
pub async fn get_amount(
    State(state): State<SharedState>,
    Query(query): Query<AmountQuery>,
) -> Json<AmountWire> {
    let amount = state.balance(&query.blockchain_address).await;
    Json(AmountWire { amount })
}
