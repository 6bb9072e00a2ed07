//! Authentication service.
//!
//! Login (optimistic), registration (auto-login), logout, and session
//! restore from durable storage.

mod error;

pub use error::AuthError;

use chrono::Utc;
use foody_core::{AuthUser, SessionStatus};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, AuthResponse, LoginRequest, RegisterRequest};
use crate::optimistic::{self, Outcome};
use crate::state::{LoginMutation, Session, SessionAction, Store};
use crate::storage::{RememberedCredentials, SessionStorage};
use crate::validation::{LoginForm, RegisterForm};

/// Authentication service.
///
/// Borrows the client's gateway, store, and storage; obtained from
/// [`crate::FoodyClient::auth`].
#[derive(Debug, Clone, Copy)]
pub struct AuthService<'a> {
    api: &'a ApiClient,
    store: &'a Store,
    storage: &'a SessionStorage,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(api: &'a ApiClient, store: &'a Store, storage: &'a SessionStorage) -> Self {
        Self {
            api,
            store,
            storage,
        }
    }

    // =========================================================================
    // Login / Register
    // =========================================================================

    /// Log in with email and password.
    ///
    /// The session shows `Authenticating` with a provisional user while the
    /// request is in flight. On failure the previous session is restored
    /// exactly and the message is kept as the store's login error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid (nothing is
    /// sent), `AuthError::LoginInProgress` if a login is already in flight,
    /// `AuthError::Api` if the backend rejects the credentials, and
    /// `AuthError::Storage` if the new session cannot be saved.
    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn login(&self, form: &LoginForm) -> Result<AuthUser, AuthError> {
        form.validate()?;

        let email = form.email.trim().to_string();
        let request = LoginRequest {
            email: email.clone(),
            password: form.password.clone(),
        };

        self.store.set_login_error(None).await;
        let mutation = LoginMutation::new(email.clone());
        let result =
            optimistic::run(self.store.session_state(), &mutation, self.api.login(&request)).await;

        let auth = match result {
            Ok(Outcome::Committed(auth)) => auth,
            Ok(Outcome::Suppressed) => return Err(AuthError::LoginInProgress),
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.store.set_login_error(Some(e.user_message())).await;
                return Err(e.into());
            }
        };

        let credentials = form.remember_me.then(|| RememberedCredentials {
            email,
            password: form.password.clone(),
            name: auth.user.name.clone(),
            phone: auth.user.phone_number.clone(),
        });
        self.persist(&auth, credentials.as_ref()).await?;

        info!("Logged in");
        Ok(auth.user)
    }

    /// Register a new account and log it in.
    ///
    /// There is no optimistic prediction: a failed registration leaves the
    /// session untouched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the form is invalid (nothing is
    /// sent), `AuthError::Api` if the backend rejects the registration, and
    /// `AuthError::Storage` if the new session cannot be saved.
    #[instrument(skip(self, form), fields(email = %form.email.trim()))]
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthUser, AuthError> {
        form.validate()?;

        let request = RegisterRequest {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            password: form.password.clone(),
        };

        let auth = self.api.register(&request).await.inspect_err(|e| {
            warn!(error = %e, "Registration failed");
        })?;

        self.store
            .dispatch_session(SessionAction::Succeeded {
                user: auth.user.clone(),
                token: auth.token.clone(),
                at: Utc::now(),
            })
            .await;

        let credentials = RememberedCredentials {
            email: request.email,
            password: request.password,
            name: Some(request.name),
            phone: Some(request.phone),
        };
        self.persist(&auth, Some(&credentials)).await?;

        info!("Registered and logged in");
        Ok(auth.user)
    }

    /// Install a confirmed identity in the gateway and durable storage.
    async fn persist(
        &self,
        auth: &AuthResponse,
        credentials: Option<&RememberedCredentials>,
    ) -> Result<(), AuthError> {
        self.api.set_token(auth.token.clone()).await;
        self.storage.set_token(&auth.token)?;
        self.storage.set_user(&auth.user)?;
        if let Some(credentials) = credentials {
            self.storage.set_credentials(credentials)?;
        }
        Ok(())
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Log out: drop the stored token and cached user, reset the session,
    /// and stop sending the bearer token. Remembered credentials are kept.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if storage cannot be written. The
    /// in-memory session is reset regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.dispatch_session(SessionAction::LoggedOut).await;
        self.store.set_login_error(None).await;
        self.api.clear_token().await;

        self.storage.clear_token()?;
        self.storage.clear_user()?;

        info!("Logged out");
        Ok(())
    }

    /// Load the session saved by a previous run.
    ///
    /// A stored token restores an authenticated session without a network
    /// call; the cached user is only trusted alongside a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if storage cannot be read.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Session, AuthError> {
        let token = self.storage.token()?;
        let user = if token.is_some() {
            self.storage.user()?
        } else {
            None
        };

        if let Some(token) = &token {
            self.api.set_token(token.clone()).await;
        }

        debug!(
            has_token = token.is_some(),
            has_user = user.is_some(),
            "Restoring session"
        );
        self.store
            .dispatch_session(SessionAction::Restored { user, token })
            .await;

        Ok(self.store.session().await)
    }

    /// Fetch the profile when a token is known but the user is not.
    ///
    /// Returns the known user without a request when there is one. If the
    /// backend refuses the token, the session fails (user and token
    /// cleared) and the stored token is dropped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotLoggedIn` without a token, `AuthError::Api` if
    /// the profile request fails, and `AuthError::Storage` if storage
    /// cannot be written.
    #[instrument(skip(self))]
    pub async fn hydrate_profile(&self) -> Result<AuthUser, AuthError> {
        let session = self.store.session().await;
        if let Some(user) = session.user {
            return Ok(user);
        }
        let Some(token) = session.token else {
            return Err(AuthError::NotLoggedIn);
        };

        match self.api.profile().await {
            Ok(user) => {
                self.store
                    .dispatch_session(SessionAction::Succeeded {
                        user: user.clone(),
                        token,
                        at: session.last_login_at.unwrap_or_else(Utc::now),
                    })
                    .await;
                self.storage.set_user(&user)?;
                debug!("Profile hydrated");
                Ok(user)
            }
            Err(e) if e.is_unauthorized() => {
                warn!(error = %e, "Stored token rejected, clearing session");
                self.store
                    .dispatch_session(SessionAction::Failed {
                        message: e.user_message(),
                    })
                    .await;
                self.api.clear_token().await;
                self.storage.clear_token()?;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Login form prefilled from the remembered credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if storage cannot be read.
    pub fn prefill(&self) -> Result<LoginForm, AuthError> {
        Ok(match self.storage.credentials()? {
            Some(credentials) => LoginForm {
                email: credentials.email,
                password: credentials.password,
                remember_me: true,
            },
            None => LoginForm::new(String::new(), String::new()),
        })
    }

    /// Whether a token or a user is present.
    pub async fn is_authenticated(&self) -> bool {
        self.store.session().await.is_authenticated()
    }

    /// Current session status.
    pub async fn status(&self) -> SessionStatus {
        self.store.session().await.status
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::{ExposeSecret, SecretString};

    use super::*;
    use crate::config::ClientConfig;
    use crate::storage::MemoryStorage;

    struct Fixture {
        api: ApiClient,
        store: Store,
        storage: SessionStorage,
    }

    impl Fixture {
        fn new() -> Self {
            // Nothing listens on the discard port; tests here never reach it.
            let config = ClientConfig::for_base_url("http://127.0.0.1:9").unwrap();
            Self {
                api: ApiClient::new(&config).unwrap(),
                store: Store::new(),
                storage: SessionStorage::new(Arc::new(MemoryStorage::new())),
            }
        }

        const fn auth(&self) -> AuthService<'_> {
            AuthService::new(&self.api, &self.store, &self.storage)
        }
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let fx = Fixture::new();
        let err = fx
            .auth()
            .login(&LoginForm::new("bad", "123"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(fx.store.session().await, Session::default());
    }

    #[tokio::test]
    async fn test_login_in_progress_is_suppressed() {
        let fx = Fixture::new();
        fx.store
            .dispatch_session(SessionAction::LoginStarted {
                email: "a@example.com".to_string(),
            })
            .await;

        let err = fx
            .auth()
            .login(&LoginForm::new("a@example.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::LoginInProgress));
    }

    #[tokio::test]
    async fn test_restore_with_token_and_user() {
        let fx = Fixture::new();
        fx.storage.set_token(&SecretString::from("stored")).unwrap();
        fx.storage
            .set_user(&AuthUser::provisional("a@example.com"))
            .unwrap();

        let session = fx.auth().restore().await.unwrap();

        assert_eq!(session.status, SessionStatus::Authenticated);
        assert_eq!(session.token.unwrap().expose_secret(), "stored");
        assert!(fx.api.has_token().await);
    }

    #[tokio::test]
    async fn test_restore_ignores_user_without_token() {
        let fx = Fixture::new();
        fx.storage
            .set_user(&AuthUser::provisional("a@example.com"))
            .unwrap();

        let session = fx.auth().restore().await.unwrap();
        assert_eq!(session, Session::default());
        assert!(!fx.auth().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_keeps_credentials() {
        let fx = Fixture::new();
        fx.storage.set_token(&SecretString::from("stored")).unwrap();
        fx.storage
            .set_credentials(&RememberedCredentials {
                email: "a@example.com".to_string(),
                password: SecretString::from("secret1"),
                name: None,
                phone: None,
            })
            .unwrap();
        fx.auth().restore().await.unwrap();

        fx.auth().logout().await.unwrap();

        assert_eq!(fx.store.session().await, Session::default());
        assert!(fx.storage.token().unwrap().is_none());
        assert!(!fx.api.has_token().await);

        let form = fx.auth().prefill().unwrap();
        assert_eq!(form.email, "a@example.com");
        assert_eq!(form.password.expose_secret(), "secret1");
        assert!(form.remember_me);
    }

    #[tokio::test]
    async fn test_prefill_without_credentials_is_blank() {
        let fx = Fixture::new();
        let form = fx.auth().prefill().unwrap();
        assert!(form.email.is_empty());
        assert!(form.remember_me);
    }

    #[tokio::test]
    async fn test_hydrate_requires_token() {
        let fx = Fixture::new();
        let err = fx.auth().hydrate_profile().await.unwrap_err();
        assert!(matches!(err, AuthError::NotLoggedIn));
    }

    #[tokio::test]
    async fn test_hydrate_returns_known_user_without_request() {
        let fx = Fixture::new();
        fx.storage.set_token(&SecretString::from("stored")).unwrap();
        fx.storage
            .set_user(&AuthUser::provisional("a@example.com"))
            .unwrap();
        fx.auth().restore().await.unwrap();

        let user = fx.auth().hydrate_profile().await.unwrap();
        assert_eq!(user.email, "a@example.com");
    }
}
