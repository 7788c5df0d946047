use chrono::{DateTime, Utc};

/// What the client currently believes about its credentials.
///
/// `is_valid` only turns true after a server round trip (or a fresh login).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub token: Option<String>,
    pub last_validated_at: Option<DateTime<Utc>>,
    pub is_valid: bool,
}

impl AuthSession {
    pub(crate) fn mark_valid(&mut self, token: String) {
        self.token = Some(token);
        self.is_valid = true;
        self.last_validated_at = Some(Utc::now());
    }

    pub(crate) fn mark_invalid(&mut self) {
        self.token = None;
        self.is_valid = false;
        self.last_validated_at = Some(Utc::now());
    }

    pub(crate) fn reset(&mut self) {
        *self = AuthSession::default();
    }
}
