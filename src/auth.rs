//! Authentication-gated navigation.
//!
//! [`AuthGuard`] runs one full evaluation per navigation and either lets the
//! route render or redirects with an optional [`Notice`]. Login and logout
//! live here too since they are the only other writers of the token.

mod backend;
mod guard;
mod route;
mod session;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use backend::AuthBackend;
pub use guard::{AuthGuard, Evaluation, GuardDecision};
pub use route::{Notice, Route};
pub use session::AuthSession;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no token stored")]
    NoToken,
    #[error("token rejected by server")]
    InvalidToken,
    #[error("could not reach the server")]
    NetworkFailure,
    #[error("username and password are required")]
    MissingCredentials,
    #[error("login rejected: {0}")]
    LoginRejected(String),
}

impl AuthError {
    /// Every auth failure resolves to something the user can read.
    pub fn notice(&self) -> Notice {
        match self {
            AuthError::NoToken => Notice::LoginRequired,
            AuthError::InvalidToken => Notice::SessionExpired,
            AuthError::NetworkFailure => Notice::Message(
                "Could not reach the server. Please try again.".to_string(),
            ),
            AuthError::MissingCredentials => {
                Notice::Message("Please enter both username and password.".to_string())
            }
            AuthError::LoginRejected(msg) => Notice::Message(msg.clone()),
        }
    }
}
