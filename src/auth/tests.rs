use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::api::ApiError;
use crate::secret::{MemorySecretStore, SecretStore, TOKEN_KEY};

/// One scripted server answer.
struct Reply {
    delay: Duration,
    result: Result<bool, ()>,
}

#[derive(Default)]
struct FakeBackend {
    validations: RefCell<VecDeque<Reply>>,
    validate_calls: RefCell<Vec<String>>,
    login_result: RefCell<Option<Result<String, ApiError>>>,
}

impl FakeBackend {
    fn answering(replies: Vec<Reply>) -> Self {
        Self {
            validations: RefCell::new(replies.into()),
            ..Default::default()
        }
    }
}

impl AuthBackend for &FakeBackend {
    async fn validate(&self, token: &str) -> Result<bool, ApiError> {
        self.validate_calls.borrow_mut().push(token.to_string());
        let reply = self.validations.borrow_mut().pop_front().unwrap_or(Reply {
            delay: Duration::ZERO,
            result: Ok(true),
        });
        tokio::time::sleep(reply.delay).await;
        reply.result.map_err(|()| ApiError::Decode("fake".into()))
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<String, ApiError> {
        self.login_result
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok("fresh".to_string()))
    }
}

fn now(result: Result<bool, ()>) -> Reply {
    Reply {
        delay: Duration::ZERO,
        result,
    }
}

fn after(ms: u64, result: Result<bool, ()>) -> Reply {
    Reply {
        delay: Duration::from_millis(ms),
        result,
    }
}

fn store_with_token(token: Option<&str>) -> Rc<MemorySecretStore> {
    let store = Rc::new(MemorySecretStore::default());
    if let Some(t) = token {
        store.set(TOKEN_KEY, t).unwrap();
    }
    store
}

fn guard<'a>(
    backend: &'a FakeBackend,
    store: &Rc<MemorySecretStore>,
) -> AuthGuard<&'a FakeBackend> {
    AuthGuard::new(backend, store.clone(), Duration::from_millis(8000))
}

fn decision(e: Evaluation) -> GuardDecision {
    match e {
        Evaluation::Decided { decision, .. } => decision,
        Evaluation::Superseded => panic!("unexpected supersede"),
    }
}

fn redirect(to: Route, notice: Option<Notice>) -> GuardDecision {
    GuardDecision::Redirect { to, notice }
}

#[test]
fn routes_parse_and_protect() {
    assert_eq!(Route::parse("/"), Route::Root);
    assert_eq!(Route::parse("/login"), Route::Login);
    assert_eq!(Route::parse("/search/"), Route::Search);
    assert_eq!(Route::parse("/playlist"), Route::Playlist);
    assert_eq!(Route::parse("/nope"), Route::Unknown("/nope".into()));
    assert!(Route::Search.is_protected());
    assert!(Route::Playlist.is_protected());
    assert!(!Route::Login.is_protected());
    assert!(!Route::Root.is_protected());
}

#[test]
fn notice_texts() {
    assert_eq!(Notice::LoginRequired.text(), "Please log in to continue.");
    assert_eq!(
        Notice::SessionExpired.text(),
        "Your session has expired. Please log in again."
    );
    assert_eq!(Notice::AlreadyLoggedIn.text(), "You are already logged in.");
}

#[tokio::test]
async fn root_and_unknown_redirect_without_touching_token() {
    let backend = FakeBackend::default();
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    assert_eq!(
        decision(g.evaluate(&Route::Root).await),
        redirect(Route::Login, None)
    );
    assert_eq!(
        decision(g.evaluate(&Route::Unknown("/x".into())).await),
        redirect(Route::Login, None)
    );
    assert!(backend.validate_calls.borrow().is_empty());
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
}

#[tokio::test]
async fn protected_without_token_requires_login() {
    let backend = FakeBackend::default();
    let store = store_with_token(None);
    let g = guard(&backend, &store);

    assert_eq!(
        decision(g.evaluate(&Route::Playlist).await),
        redirect(Route::Login, Some(Notice::LoginRequired))
    );
    assert!(backend.validate_calls.borrow().is_empty());
}

#[tokio::test]
async fn protected_with_valid_token_renders() {
    let backend = FakeBackend::answering(vec![now(Ok(true))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    assert_eq!(decision(g.evaluate(&Route::Search).await), GuardDecision::Render);
    assert_eq!(backend.validate_calls.borrow().as_slice(), ["tok"]);
    let session = g.session();
    assert!(session.is_valid);
    assert_eq!(session.token.as_deref(), Some("tok"));
    assert!(session.last_validated_at.is_some());
}

#[tokio::test]
async fn invalid_token_is_deleted_and_redirects_to_login() {
    let backend = FakeBackend::answering(vec![now(Ok(false))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    assert_eq!(
        decision(g.evaluate(&Route::Search).await),
        redirect(Route::Login, Some(Notice::SessionExpired))
    );
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert!(!g.is_logged_in());
}

#[tokio::test]
async fn network_failure_is_fail_closed() {
    let backend = FakeBackend::answering(vec![now(Err(()))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    assert_eq!(
        decision(g.evaluate(&Route::Playlist).await),
        redirect(Route::Login, Some(Notice::SessionExpired))
    );
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn validation_timeout_is_fail_closed() {
    let backend = FakeBackend::answering(vec![after(60_000, Ok(true))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    assert_eq!(
        decision(g.evaluate(&Route::Search).await),
        redirect(Route::Login, Some(Notice::SessionExpired))
    );
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn login_route_with_valid_token_redirects_then_search_renders() {
    let backend = FakeBackend::answering(vec![now(Ok(true)), now(Ok(true))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    let first = g.evaluate(&Route::Login).await;
    let GuardDecision::Redirect { to, notice } = decision(first) else {
        panic!("expected redirect");
    };
    assert_eq!(to, Route::Search);
    assert_eq!(notice, Some(Notice::AlreadyLoggedIn));

    assert_eq!(decision(g.evaluate(&to).await), GuardDecision::Render);
}

#[tokio::test]
async fn login_route_with_invalid_token_drops_it_and_renders() {
    let backend = FakeBackend::answering(vec![now(Ok(false))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    assert_eq!(decision(g.evaluate(&Route::Login).await), GuardDecision::Render);
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn login_route_without_token_renders() {
    let backend = FakeBackend::default();
    let store = store_with_token(None);
    let g = guard(&backend, &store);
    assert_eq!(decision(g.evaluate(&Route::Login).await), GuardDecision::Render);
}

#[tokio::test(start_paused = true)]
async fn stale_evaluation_is_superseded() {
    // The slow answer would allow; the fast newer one rejects.
    let backend = FakeBackend::answering(vec![after(500, Ok(true)), after(10, Ok(false))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    let (old, new) = tokio::join!(g.evaluate(&Route::Search), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        g.evaluate(&Route::Playlist).await
    });

    assert_eq!(old, Evaluation::Superseded);
    match new {
        Evaluation::Decided {
            ticket,
            route,
            decision,
        } => {
            assert_eq!(ticket, g.latest_ticket());
            assert_eq!(route, Route::Playlist);
            assert_eq!(decision, redirect(Route::Login, Some(Notice::SessionExpired)));
        }
        Evaluation::Superseded => panic!("newest evaluation must decide"),
    }
    assert!(!g.is_logged_in());
}

#[tokio::test(start_paused = true)]
async fn stale_rejection_does_not_delete_token() {
    let backend = FakeBackend::answering(vec![after(500, Ok(false)), after(10, Ok(true))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    let (old, new) = tokio::join!(g.evaluate(&Route::Search), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        g.evaluate(&Route::Search).await
    });

    assert_eq!(old, Evaluation::Superseded);
    assert_eq!(decision(new), GuardDecision::Render);
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
}

#[tokio::test]
async fn login_stores_token_and_logout_clears_it() {
    let backend = FakeBackend::default();
    let store = store_with_token(None);
    let g = guard(&backend, &store);

    g.login("alice", "pw").await.unwrap();
    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
    assert!(g.is_logged_in());

    g.logout();
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert!(!g.is_logged_in());
    assert_eq!(g.session(), AuthSession::default());
}

#[tokio::test]
async fn login_requires_both_fields() {
    let backend = FakeBackend::default();
    let store = store_with_token(None);
    let g = guard(&backend, &store);

    assert_eq!(g.login("  ", "pw").await, Err(AuthError::MissingCredentials));
    assert_eq!(g.login("alice", "").await, Err(AuthError::MissingCredentials));
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn login_rejection_carries_server_message() {
    let backend = FakeBackend::default();
    *backend.login_result.borrow_mut() = Some(Err(ApiError::Rejected("Wrong password".into())));
    let store = store_with_token(None);
    let g = guard(&backend, &store);

    let err = g.login("alice", "bad").await.unwrap_err();
    assert_eq!(err, AuthError::LoginRejected("Wrong password".into()));
    assert_eq!(err.notice().text(), "Wrong password");
    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn logout_supersedes_in_flight_evaluation() {
    let backend = FakeBackend::answering(vec![after(100, Ok(true))]);
    let store = store_with_token(Some("tok"));
    let g = guard(&backend, &store);

    let (eval, ()) = tokio::join!(g.evaluate(&Route::Search), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        g.logout();
    });
    assert_eq!(eval, Evaluation::Superseded);
    assert!(!g.is_logged_in());
}
