/// Session manager
///
/// Owns the single [`Session`] of the running client and is the only place that
/// writes it. Every commit is published on a `watch` channel, so the route
/// guard and anything else that branches on authentication always read the
/// latest value.
///
/// Operations are not serialized against each other: two overlapping calls
/// commit in the order their responses arrive and the last one wins. Callers
/// that need ordering must keep the triggering control disabled while an
/// operation is in flight.
use std::sync::Arc;

use tokio::sync::{watch, OnceCell};

use crate::{
    api::AuthApi,
    error::AppResult,
    models::{Session, User},
};

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: Arc<dyn AuthApi>,
    state: watch::Sender<Session>,
    initialized: OnceCell<()>,
}

impl SessionManager {
    /// Creates the manager with an initializing, anonymous session.
    ///
    /// No request is made until [`SessionManager::initialize`] runs.
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        let (state, _) = watch::channel(Session::new());
        Self {
            inner: Arc::new(SessionInner {
                api,
                state,
                initialized: OnceCell::new(),
            }),
        }
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Read-only handle that observes every commit
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Runs the initial identity check and resolves the session.
    ///
    /// Only the first call issues a request; concurrent callers wait for it and
    /// later callers return immediately. A failed check means "anonymous" and
    /// is never recorded as an error.
    pub async fn initialize(&self) {
        self.inner
            .initialized
            .get_or_init(|| async {
                let user = self.identity_check().await;
                let authenticated = user.is_some();

                self.inner.state.send_modify(|session| {
                    session.set_user(user);
                    session.resolve();
                });

                tracing::info!(authenticated, "Session resolved");
            })
            .await;
    }

    /// Signs in, then reads the identity the new session cookie maps to.
    ///
    /// On failure the user is left as it was and the message is kept in
    /// `last_error` as well as returned.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        self.clear_error();

        let result = async {
            self.inner.api.login(email, password).await?;
            self.inner.api.current_user().await
        }
        .await;

        self.commit("login", result)
    }

    /// Creates an account; the response body is the new identity.
    pub async fn register(&self, email: &str, password: &str, display_name: &str) -> AppResult<User> {
        self.clear_error();

        let result = self
            .inner
            .api
            .register(email, password, display_name)
            .await;

        self.commit("register", result)
    }

    /// Signs out. The local user is cleared even if the server call fails.
    pub async fn logout(&self) {
        self.clear_error();

        if let Err(e) = self.inner.api.logout().await {
            tracing::warn!(error = %e, "Logout request failed, clearing session anyway");
        }

        self.inner.state.send_modify(|session| session.set_user(None));
        tracing::info!("Signed out");
    }

    /// Re-reads the identity and overwrites the user with it.
    ///
    /// Any failure leaves the session anonymous without recording an error.
    pub async fn refresh(&self) -> Option<User> {
        self.clear_error();

        let user = self.identity_check().await;
        self.inner
            .state
            .send_modify(|session| session.set_user(user.clone()));
        user
    }

    async fn identity_check(&self) -> Option<User> {
        match self.inner.api.current_user().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!(error = %e, "Identity check failed, treating visitor as anonymous");
                None
            }
        }
    }

    fn clear_error(&self) {
        self.inner.state.send_if_modified(|session| {
            let had_error = session.last_error().is_some();
            session.set_error(None);
            had_error
        });
    }

    fn commit(&self, operation: &'static str, result: AppResult<User>) -> AppResult<User> {
        match result {
            Ok(user) => {
                tracing::info!(operation, user_id = user.id, "Signed in");
                let committed = user.clone();
                self.inner
                    .state
                    .send_modify(|session| session.set_user(Some(committed)));
                Ok(user)
            }
            Err(e) => {
                tracing::info!(operation, error = %e, "Authentication failed");
                let message = e.to_string();
                self.inner
                    .state
                    .send_modify(|session| session.set_error(Some(message)));
                Err(e)
            }
        }
    }
}
