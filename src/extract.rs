use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::ApiError;

/// Local version of [`axum::Json`] whose rejections go through [`ApiError`].
/// Responses serialize exactly like [`axum::Json`].
///
/// A body sent without a JSON content type reads as an empty object, so the
/// handler's own checks decide the response. Unparseable JSON is a 400;
/// JSON whose fields have the wrong types is a 500, like any other failure
/// to turn the request into a stored record.
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(inner) => Ok(Json(inner.0)),
            Err(JsonRejection::MissingJsonContentType(_)) => Ok(Json(T::default())),
            Err(error) => Err(error.into()),
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(error: JsonRejection) -> Self {
        match error {
            JsonRejection::JsonSyntaxError(e) => ApiError::MalformedBody(e.body_text()),
            JsonRejection::JsonDataError(e) => {
                ApiError::Internal(anyhow::anyhow!("request body has wrong types: {}", e.body_text()))
            }
            inner => {
                warn!("unhandled axum::JsonRejection category: {inner:?}");
                ApiError::Internal(anyhow::anyhow!(inner.body_text()))
            }
        }
    }
}
