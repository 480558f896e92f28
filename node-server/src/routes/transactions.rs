use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use chain::{SignedSubmission, SignedSubmissionWire, TransactionPoolWire};

use crate::error::{ApiError, ValidatedJson};
use crate::state::SharedState;

/// `GET /transactions`
pub async fn get_transactions(State(state): State<SharedState>) -> Json<TransactionPoolWire> {
    let transactions = state.pool_snapshot().await;
    Json(TransactionPoolWire {
        length: transactions.len(),
        transactions,
    })
}

/// `POST /transactions`: a locally-submitted signed transaction. On
/// success, it is announced to every known peer.
pub async fn post_transaction(
    State(state): State<SharedState>,
    ValidatedJson(wire): ValidatedJson<SignedSubmissionWire>,
) -> Result<StatusCode, ApiError> {
    let submission: SignedSubmission = wire.clone().into();
    state.submit_local_transaction(submission, wire).await?;
    Ok(StatusCode::CREATED)
}

/// `PUT /transactions`: a peer-originated pool insert. Same admission
/// rules as `POST`, but never re-announced.
pub async fn put_transaction(
    State(state): State<SharedState>,
    ValidatedJson(wire): ValidatedJson<SignedSubmissionWire>,
) -> Result<StatusCode, ApiError> {
    let submission: SignedSubmission = wire.into();
    state.admit_peer_transaction(submission).await?;
    Ok(StatusCode::CREATED)
}

/// `DELETE /transactions`: clear the pool. Called by peers right after
/// they mine a block.
pub async fn delete_transactions(State(state): State<SharedState>) -> StatusCode {
    state.clear_pool().await;
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::test_state;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{delete, get, post, put};
    use axum::Router;
    use chain::TransactionRecord;
    use p256::ecdsa::{SigningKey, VerifyingKey};
    use rand_core::OsRng;
    use tower::ServiceExt;

    fn app(state: SharedState) -> Router {
        Router::new()
            .route("/transactions", get(get_transactions))
            .route("/transactions", post(post_transaction))
            .route("/transactions", put(put_transaction))
            .route("/transactions", delete(delete_transactions))
            .with_state(state)
    }

    #[tokio::test]
    async fn get_transactions_reports_empty_pool_on_a_fresh_node() {
        let response = app(test_state())
            .oneshot(Request::builder().uri("/transactions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let wire: TransactionPoolWire = serde_json::from_slice(&body).unwrap();
        assert_eq!(wire.length, 0);
        assert!(wire.transactions.is_empty());
    }

    #[tokio::test]
    async fn post_transaction_with_invalid_signature_is_rejected() {
        let signing_key = SigningKey::random(&mut OsRng);
        let record = TransactionRecord::new("alice", "bob", 1.0);
        let verifying_key = VerifyingKey::from(&signing_key);

        let wire = SignedSubmissionWire {
            record,
            public_key: chain::crypto::verifying_key_to_hex(&verifying_key),
            signature: "00".repeat(64),
        };

        let body = serde_json::to_vec(&wire).unwrap();
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transactions")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_transaction_with_a_missing_field_reports_malformed_request() {
        // No `signature` field at all, not just an empty one.
        let body = serde_json::json!({
            "sender_blockchain_address": "alice",
            "recipient_blockchain_address": "bob",
            "value": 1.0,
            "public_key": "00".repeat(128),
        });

        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transactions")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let wire: chain::StatusWire = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(wire.message, "failed");
    }

    #[tokio::test]
    async fn post_transaction_with_unparseable_json_reports_malformed_request() {
        let response = app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transactions")
                    .header("content-type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let wire: chain::StatusWire = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(wire.message, "failed");
    }

    #[tokio::test]
    async fn delete_transactions_clears_the_pool() {
        let state = test_state();
        let response = app(state)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/transactions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
