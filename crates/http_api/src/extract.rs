use axum::{
    Json,
    async_trait,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::errors::HttpError;

/// `Json` whose rejections use the API error body.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
