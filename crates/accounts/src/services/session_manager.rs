//! Session tracking for the current identity and profile.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use hearthside_config::AppConfig;

use crate::entities::{Identity, IdentityEvent, Profile, ProfilePatch, Role, Session};
use crate::services::access_gate::{AccessGate, GateDecision};
use crate::stores::{CredentialProvider, ProfileStore};
use crate::types::{AuthError, AuthResult, ProviderResult, SignUpRequest};

/// Tracks the current identity and its profile for one logical session.
///
/// Identity-change notifications, sign-in, sign-up, and sign-out all funnel
/// into a single epoch-guarded commit: every state change bumps the epoch,
/// and an asynchronous profile fetch only lands if no newer change arrived
/// while it was in flight. A stale fetch for an earlier identity is
/// discarded instead of clobbering the session.
#[derive(Clone)]
pub struct SessionManager {
    provider: Arc<dyn CredentialProvider>,
    profiles: Arc<dyn ProfileStore>,
    state: Arc<RwLock<Session>>,
    epoch: Arc<AtomicU64>,
    provider_timeout: Duration,
}

impl SessionManager {
    pub fn new(
        provider: Arc<dyn CredentialProvider>,
        profiles: Arc<dyn ProfileStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            provider,
            profiles,
            state: Arc::new(RwLock::new(Session::default())),
            epoch: Arc::new(AtomicU64::new(0)),
            provider_timeout: config.provider.request_timeout(),
        }
    }

    /// Drive the session from the provider's identity-event stream.
    pub fn spawn_listener(&self) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        let mut events = self.provider.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(IdentityEvent::SignedIn { identity }) => {
                        manager.on_identity_changed(Some(identity)).await;
                    }
                    Ok(IdentityEvent::SignedOut) => {
                        manager.on_identity_changed(None).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "identity event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// React to an identity change reported by the credential provider.
    ///
    /// The new identity is visible immediately with `loading = true`; the
    /// profile lands once its fetch resolves, unless a newer identity
    /// change won the race in the meantime.
    pub async fn on_identity_changed(&self, identity: Option<Identity>) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.identity = identity.clone();
        }

        let profile = match &identity {
            Some(identity) => match self.profiles.get_profile(&identity.id).await {
                Ok(profile) => profile,
                Err(err) => {
                    warn!(identity_id = %identity.id, error = %err, "profile fetch failed on identity change");
                    None
                }
            },
            None => None,
        };

        let mut state = self.state.write().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding stale profile fetch");
            return;
        }
        state.profile = profile;
        state.loading = false;
    }

    /// Authenticate with email and password.
    ///
    /// On failure the session is left unauthenticated.
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<(Identity, Option<Profile>)> {
        let identity = self
            .provider_call(self.provider.sign_in(email, password))
            .await?;

        let profile = match self.profiles.get_profile(&identity.id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(identity_id = %identity.id, error = %err, "profile fetch failed after sign-in");
                None
            }
        };

        self.commit(Some(identity.clone()), profile.clone()).await;
        info!(identity_id = %identity.id, "signed in");
        Ok((identity, profile))
    }

    /// Self-registration: create an identity and a pending profile.
    pub async fn sign_up(&self, request: SignUpRequest) -> AuthResult<(Identity, Profile)> {
        request.validate().map_err(AuthError::Validation)?;

        let identity = self
            .provider_call(
                self.provider
                    .create_identity(&request.email, &request.password),
            )
            .await?;
        let identity = self
            .provider_call(
                self.provider
                    .update_display_name(&identity.id, &request.display_name),
            )
            .await?;

        let mut profile = Profile::new(
            &identity.id,
            &request.email,
            &request.display_name,
            request.role,
        );
        if let Some(status) = request.status {
            profile.status = status;
        }
        profile.details = request.details.clone();

        self.profiles
            .set_profile(&profile)
            .await
            .map_err(|err| AuthError::Provider(err.to_string()))?;

        self.commit(Some(identity.clone()), Some(profile.clone()))
            .await;
        info!(identity_id = %identity.id, role = %profile.role, "signed up");
        Ok((identity, profile))
    }

    /// Sign out. The local session clear is authoritative: a provider
    /// failure is logged and otherwise ignored.
    pub async fn sign_out(&self) {
        let result = match timeout(self.provider_timeout, self.provider.sign_out()).await {
            Ok(result) => result,
            Err(_) => Err(crate::types::ProviderError::Timeout),
        };
        if let Err(err) = result {
            warn!(error = %err, "provider sign-out failed; clearing local session anyway");
        }

        self.commit(None, None).await;
        info!("signed out");
    }

    /// Re-fetch the profile for the current identity. No-op when
    /// unauthenticated.
    pub async fn refresh_profile(&self) -> AuthResult<Option<Profile>> {
        let identity = { self.state.read().await.identity.clone() };
        let Some(identity) = identity else {
            return Ok(None);
        };

        let epoch = self.epoch.load(Ordering::SeqCst);
        let profile = self
            .profiles
            .get_profile(&identity.id)
            .await
            .map_err(AuthError::from)?;

        let mut state = self.state.write().await;
        if self.epoch.load(Ordering::SeqCst) == epoch {
            state.profile = profile.clone();
        }
        Ok(profile)
    }

    /// Persist a profile patch for the current identity and refresh the
    /// session snapshot.
    pub async fn update_profile(&self, patch: ProfilePatch) -> AuthResult<Profile> {
        let identity = { self.state.read().await.identity.clone() }
            .ok_or(AuthError::ProfileNotFound)?;

        let updated = self
            .profiles
            .update_profile(&identity.id, &patch)
            .await
            .map_err(AuthError::from)?;

        let mut state = self.state.write().await;
        if state.identity.as_ref().map(|i| i.id.as_str()) == Some(identity.id.as_str()) {
            state.profile = Some(updated.clone());
        }
        Ok(updated)
    }

    /// Cloned snapshot of the current session.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn has_role(&self, allowed: &[Role]) -> bool {
        self.state.read().await.has_role(allowed)
    }

    pub async fn is_verified(&self) -> bool {
        self.state.read().await.is_verified()
    }

    pub async fn is_approved(&self) -> bool {
        self.state.read().await.is_approved()
    }

    /// Evaluate a gate against the current session state. Decisions are
    /// never cached; every call sees the live session.
    pub async fn check_access(&self, gate: &AccessGate) -> GateDecision {
        gate.evaluate(&*self.state.read().await)
    }

    /// Commit a fully resolved session state, invalidating any in-flight
    /// profile fetch.
    async fn commit(&self, identity: Option<Identity>, profile: Option<Profile>) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().await;
        state.identity = identity;
        state.profile = profile;
        state.loading = false;
    }

    async fn provider_call<T>(
        &self,
        call: impl Future<Output = ProviderResult<T>>,
    ) -> AuthResult<T> {
        match timeout(self.provider_timeout, call).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_) => Err(AuthError::Timeout),
        }
    }
}
