use crate::api::{ApiClient, ApiError};

/// Server side of authentication.
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    /// `Ok(false)` for a rejected token; `Err` only when the server was not
    /// reached or answered garbage.
    async fn validate(&self, token: &str) -> Result<bool, ApiError>;

    /// Exchange credentials for a token.
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;
}

impl AuthBackend for ApiClient {
    async fn validate(&self, token: &str) -> Result<bool, ApiError> {
        ApiClient::validate(self, token).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        ApiClient::login(self, username, password).await
    }
}
