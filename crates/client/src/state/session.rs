//! Authentication session state.

use chrono::{DateTime, Utc};
use foody_core::{AuthUser, SessionStatus};
use secrecy::{ExposeSecret, SecretString};

use crate::api::AuthResponse;
use crate::optimistic::Mutation;

/// The client's view of who is logged in.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<AuthUser>,
    pub token: Option<SecretString>,
    pub status: SessionStatus,
    pub error: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        let token = |s: &Self| s.token.as_ref().map(|t| t.expose_secret().to_string());
        self.user == other.user
            && token(self) == token(other)
            && self.status == other.status
            && self.error == other.error
            && self.last_login_at == other.last_login_at
    }
}

impl Session {
    /// Whether a token or a user is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some() || self.user.is_some()
    }

    /// Apply a state transition.
    pub fn reduce(&mut self, action: SessionAction) {
        match action {
            SessionAction::LoginStarted { email } => {
                self.user = Some(AuthUser::provisional(email));
                self.status = SessionStatus::Authenticating;
                self.error = None;
            }
            SessionAction::Restored { user, token } => {
                self.status = if token.is_some() || user.is_some() {
                    SessionStatus::Authenticated
                } else {
                    SessionStatus::Idle
                };
                self.user = user;
                self.token = token;
                self.error = None;
            }
            SessionAction::Succeeded { user, token, at } => {
                self.user = Some(user);
                self.token = Some(token);
                self.status = SessionStatus::Authenticated;
                self.error = None;
                self.last_login_at = Some(at);
            }
            SessionAction::Failed { message } => {
                self.user = None;
                self.token = None;
                self.status = SessionStatus::Error;
                self.error = Some(message);
            }
            SessionAction::LoggedOut => *self = Self::default(),
        }
    }
}

/// Session state transitions.
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Optimistic login prediction: provisional user, `Authenticating`.
    LoginStarted { email: String },
    /// Session loaded from durable storage.
    Restored {
        user: Option<AuthUser>,
        token: Option<SecretString>,
    },
    /// The backend confirmed the identity.
    Succeeded {
        user: AuthUser,
        token: SecretString,
        at: DateTime<Utc>,
    },
    /// Authentication failed; user and token are cleared.
    Failed { message: String },
    /// Back to the initial session.
    LoggedOut,
}

// =============================================================================
// Login Mutation
// =============================================================================

/// Optimistic login.
///
/// Predicts `Authenticating` with a provisional user, commits the backend's
/// user and token, and on failure restores the exact session that preceded
/// the attempt. Suppressed while another login is in flight.
#[derive(Debug, Clone)]
pub struct LoginMutation {
    email: String,
}

impl LoginMutation {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

impl Mutation for LoginMutation {
    type State = Session;
    type Snapshot = Session;
    type Output = AuthResponse;

    fn name(&self) -> &'static str {
        "login"
    }

    fn prepare(&self, state: &Session) -> Option<Session> {
        (state.status != SessionStatus::Authenticating).then(|| state.clone())
    }

    fn apply(&self, state: &mut Session) {
        state.reduce(SessionAction::LoginStarted {
            email: self.email.clone(),
        });
    }

    fn commit(&self, state: &mut Session, output: &AuthResponse) {
        state.reduce(SessionAction::Succeeded {
            user: output.user.clone(),
            token: output.token.clone(),
            at: Utc::now(),
        });
    }

    fn rollback(&self, state: &mut Session, snapshot: Session) {
        *state = snapshot;
    }
}
