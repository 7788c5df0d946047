use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::secret::{SecretStore, clear_token, load_token, store_token};

use super::backend::AuthBackend;
use super::route::{Notice, Route};
use super::session::AuthSession;
use super::AuthError;

/// Outcome of one navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect { to: Route, notice: Option<Notice> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Decided {
        ticket: u64,
        route: Route,
        decision: GuardDecision,
    },
    /// A newer evaluation (or a login/logout) started while this one was
    /// waiting on the server. Its result must be ignored.
    Superseded,
}

/// Gatekeeper for protected routes.
///
/// Each evaluation takes a ticket; after every suspension it checks that the
/// ticket is still the latest and otherwise gives up without side effects.
pub struct AuthGuard<B> {
    backend: B,
    store: Rc<dyn SecretStore>,
    session: RefCell<AuthSession>,
    latest: Cell<u64>,
    validate_timeout: Duration,
}

impl<B: AuthBackend> AuthGuard<B> {
    pub fn new(backend: B, store: Rc<dyn SecretStore>, validate_timeout: Duration) -> Self {
        Self {
            backend,
            store,
            session: RefCell::new(AuthSession::default()),
            latest: Cell::new(0),
            validate_timeout,
        }
    }

    pub fn session(&self) -> AuthSession {
        self.session.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.borrow().is_valid
    }

    /// Ticket of the most recent evaluation, login or logout.
    pub fn latest_ticket(&self) -> u64 {
        self.latest.get()
    }

    fn next_ticket(&self) -> u64 {
        let ticket = self.latest.get() + 1;
        self.latest.set(ticket);
        ticket
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest.get() == ticket
    }

    /// Decide whether `route` may render.
    pub async fn evaluate(&self, route: &Route) -> Evaluation {
        let ticket = self.next_ticket();
        debug!(ticket, %route, "evaluating route");

        let decision = match route {
            Route::Root | Route::Unknown(_) => GuardDecision::Redirect {
                to: Route::Login,
                notice: None,
            },

            Route::Login => match load_token(self.store.as_ref()) {
                None => GuardDecision::Render,
                Some(token) => {
                    let Some(checked) = self.check(ticket, &token).await else {
                        return Evaluation::Superseded;
                    };
                    match checked {
                        Ok(()) => GuardDecision::Redirect {
                            to: Route::DEFAULT_PROTECTED,
                            notice: Some(Notice::AlreadyLoggedIn),
                        },
                        // A dead token on the login screen is just dropped.
                        Err(_) => GuardDecision::Render,
                    }
                }
            },

            Route::Search | Route::Playlist => match load_token(self.store.as_ref()) {
                None => {
                    self.session.borrow_mut().reset();
                    GuardDecision::Redirect {
                        to: Route::Login,
                        notice: Some(AuthError::NoToken.notice()),
                    }
                }
                Some(token) => {
                    let Some(checked) = self.check(ticket, &token).await else {
                        return Evaluation::Superseded;
                    };
                    match checked {
                        Ok(()) => GuardDecision::Render,
                        Err(_) => GuardDecision::Redirect {
                            to: Route::Login,
                            notice: Some(Notice::SessionExpired),
                        },
                    }
                }
            },
        };

        Evaluation::Decided {
            ticket,
            route: route.clone(),
            decision,
        }
    }

    /// Validate `token` against the server within the configured bound.
    ///
    /// Returns `None` when superseded. On failure the token is forgotten
    /// before returning.
    async fn check(&self, ticket: u64, token: &str) -> Option<Result<(), AuthError>> {
        let outcome = tokio::time::timeout(self.validate_timeout, self.backend.validate(token)).await;

        if !self.is_current(ticket) {
            debug!(ticket, latest = self.latest.get(), "stale validation discarded");
            return None;
        }

        let result = match outcome {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(AuthError::InvalidToken),
            Ok(Err(e)) => {
                warn!(error = %e, "token validation failed");
                Err(AuthError::NetworkFailure)
            }
            Err(_) => {
                warn!(timeout_ms = self.validate_timeout.as_millis() as u64, "token validation timed out");
                Err(AuthError::NetworkFailure)
            }
        };

        match &result {
            Ok(()) => self.session.borrow_mut().mark_valid(token.to_string()),
            Err(e) => {
                info!(reason = %e, "dropping stored token");
                clear_token(self.store.as_ref());
                self.session.borrow_mut().mark_invalid();
            }
        }
        Some(result)
    }

    /// Exchange credentials for a token and remember it.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let token = self.backend.login(username, password).await.map_err(|e| match e {
            ApiError::Rejected(msg) => AuthError::LoginRejected(msg),
            ApiError::Transport(_) => AuthError::NetworkFailure,
            ApiError::Status { .. } | ApiError::Decode(_) => {
                AuthError::LoginRejected("Login failed.".to_string())
            }
        })?;

        // Evaluations started before the token existed must not decide.
        self.next_ticket();
        store_token(self.store.as_ref(), &token);
        self.session.borrow_mut().mark_valid(token);
        info!(user = username, "logged in");
        Ok(())
    }

    /// Forget the token. In-flight evaluations become stale.
    pub fn logout(&self) {
        self.next_ticket();
        clear_token(self.store.as_ref());
        self.session.borrow_mut().reset();
        info!("logged out");
    }
}
