//! Lenient request-body extraction.

use std::convert::Infallible;

use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

/// Extracts `T` from a JSON or form-encoded request body.
///
/// An absent, mismatched, or unparseable body yields `T::default()` instead of
/// a rejection, so handlers see missing fields as `None` and keep full control
/// of the response. This mirrors classic body-parser middleware, where a bad
/// body leaves an empty document behind.
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let value = if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .unwrap_or_default()
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| value)
                .unwrap_or_default()
        };

        Ok(Self(value))
    }
}
