//! Translates ledger errors into HTTP responses, and a `Json` extractor
//! wrapper so a malformed or incomplete request body reports the same
//! `MalformedRequest` shape as a decode failure caught deeper in the
//! admission path.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;

use chain::{LedgerError, StatusWire};

/// Wraps [`LedgerError`] so this crate can provide the `IntoResponse`
/// impl the orphan rule would otherwise forbid.
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.0 {
            LedgerError::MalformedRequest(_) => StatusWire::failed(),
            LedgerError::InvalidSignature | LedgerError::InsufficientBalance => StatusWire::fail(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// `Json<T>`, but a decode failure — bad syntax, wrong content type, or a
/// missing required field — is reported as [`LedgerError::MalformedRequest`]
/// instead of axum's own plaintext rejection body, so every malformed
/// `/transactions` submission gets the documented `{"message":"failed"}`
/// wire shape (spec: "all five fields required; any missing field →
/// MalformedRequest").
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(malformed(rejection)),
        }
    }
}

fn malformed(rejection: JsonRejection) -> ApiError {
    ApiError(LedgerError::MalformedRequest(rejection.to_string()))
}
