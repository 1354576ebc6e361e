//! In-process store implementations.
//!
//! These back development setups and the test suites. The credential
//! provider keeps argon2-hashed secrets and broadcasts identity events the
//! same way the hosted provider does; the document stores are plain maps.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock, Semaphore};
use uuid::Uuid;

use crate::entities::{
    Application, ApplicationFilter, ApplicationPatch, Identity, IdentityEvent, Profile,
    ProfileFilter, ProfilePatch,
};
use crate::stores::{ApplicationStore, CredentialProvider, ProfileStore};
use crate::types::{ProviderError, ProviderResult};
use crate::utils::secret;

const EVENT_CHANNEL_CAPACITY: usize = 16;

struct StoredIdentity {
    identity: Identity,
    secret_hash: String,
}

/// In-process credential provider.
pub struct MemoryCredentialProvider {
    identities: RwLock<HashMap<String, StoredIdentity>>,
    email_index: RwLock<HashMap<String, String>>,
    current: RwLock<Option<Identity>>,
    events: broadcast::Sender<IdentityEvent>,
    reset_deliveries: RwLock<Vec<String>>,
    fail_next_reset: AtomicBool,
}

impl MemoryCredentialProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            identities: RwLock::new(HashMap::new()),
            email_index: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            events,
            reset_deliveries: RwLock::new(Vec::new()),
            fail_next_reset: AtomicBool::new(false),
        }
    }

    /// Addresses credential-reset mail was delivered to, oldest first.
    pub async fn reset_deliveries(&self) -> Vec<String> {
        self.reset_deliveries.read().await.clone()
    }

    /// Make the next `send_credential_reset` call fail.
    pub fn fail_next_reset(&self) {
        self.fail_next_reset.store(true, Ordering::SeqCst);
    }

    /// The identity currently signed in, if any.
    pub async fn current_identity(&self) -> Option<Identity> {
        self.current.read().await.clone()
    }

    fn broadcast(&self, event: IdentityEvent) {
        // Delivery is best-effort; a send error only means nobody listens.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for MemoryCredentialProvider {
    async fn create_identity(&self, email: &str, secret: &str) -> ProviderResult<Identity> {
        let mut email_index = self.email_index.write().await;
        if email_index.contains_key(email) {
            return Err(ProviderError::EmailTaken);
        }

        let secret_hash =
            secret::hash_secret(secret).map_err(ProviderError::Unavailable)?;
        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email: email.to_owned(),
            display_name: None,
            email_verified: false,
        };

        let mut identities = self.identities.write().await;
        email_index.insert(email.to_owned(), identity.id.clone());
        identities.insert(
            identity.id.clone(),
            StoredIdentity {
                identity: identity.clone(),
                secret_hash,
            },
        );

        Ok(identity)
    }

    async fn sign_in(&self, email: &str, secret: &str) -> ProviderResult<Identity> {
        let email_index = self.email_index.read().await;
        let identities = self.identities.read().await;

        let stored = email_index
            .get(email)
            .and_then(|id| identities.get(id))
            .ok_or(ProviderError::InvalidCredentials)?;

        if !secret::verify_secret(secret, &stored.secret_hash) {
            return Err(ProviderError::InvalidCredentials);
        }

        let identity = stored.identity.clone();
        drop(identities);
        drop(email_index);

        *self.current.write().await = Some(identity.clone());
        self.broadcast(IdentityEvent::SignedIn {
            identity: identity.clone(),
        });

        Ok(identity)
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        *self.current.write().await = None;
        self.broadcast(IdentityEvent::SignedOut);
        Ok(())
    }

    async fn update_display_name(
        &self,
        identity_id: &str,
        display_name: &str,
    ) -> ProviderResult<Identity> {
        let mut identities = self.identities.write().await;
        let stored = identities
            .get_mut(identity_id)
            .ok_or(ProviderError::NotFound)?;

        stored.identity.display_name = Some(display_name.to_owned());
        let identity = stored.identity.clone();
        drop(identities);

        let mut current = self.current.write().await;
        if current.as_ref().map(|c| c.id.as_str()) == Some(identity_id) {
            *current = Some(identity.clone());
        }

        Ok(identity)
    }

    async fn send_credential_reset(&self, email: &str) -> ProviderResult<()> {
        if self.fail_next_reset.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::DeliveryFailed(
                "mail relay unavailable".to_string(),
            ));
        }

        if !self.email_index.read().await.contains_key(email) {
            return Err(ProviderError::NotFound);
        }

        self.reset_deliveries.write().await.push(email.to_owned());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent> {
        self.events.subscribe()
    }
}

/// In-process profile store.
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, Profile>>,
    holds: StdMutex<HashMap<String, Arc<Semaphore>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            holds: StdMutex::new(HashMap::new()),
        }
    }

    /// Park subsequent reads of `id` until [`release_reads`] is called.
    /// Lets tests order overlapping profile fetches deterministically.
    ///
    /// [`release_reads`]: MemoryProfileStore::release_reads
    pub fn hold_reads(&self, id: &str) {
        self.holds
            .lock()
            .expect("holds lock poisoned")
            .insert(id.to_owned(), Arc::new(Semaphore::new(0)));
    }

    /// Release reads parked by [`hold_reads`](MemoryProfileStore::hold_reads).
    pub fn release_reads(&self, id: &str) {
        let hold = self.holds.lock().expect("holds lock poisoned").remove(id);
        if let Some(hold) = hold {
            hold.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    async fn wait_for_release(&self, id: &str) {
        let hold = self
            .holds
            .lock()
            .expect("holds lock poisoned")
            .get(id)
            .cloned();
        if let Some(hold) = hold {
            // Permit never returned; the semaphore only gates the release.
            let _ = hold.acquire().await;
        }
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, id: &str) -> ProviderResult<Option<Profile>> {
        self.wait_for_release(id).await;
        let profiles = self.profiles.read().await;
        Ok(profiles.get(id).cloned())
    }

    async fn set_profile(&self, profile: &Profile) -> ProviderResult<()> {
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn update_profile(&self, id: &str, patch: &ProfilePatch) -> ProviderResult<Profile> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.get_mut(id).ok_or(ProviderError::NotFound)?;
        patch.apply(profile);
        Ok(profile.clone())
    }

    async fn query_profiles(&self, filter: &ProfileFilter) -> ProviderResult<Vec<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .filter(|profile| filter.matches(profile))
            .cloned()
            .collect())
    }
}

/// In-process application store.
pub struct MemoryApplicationStore {
    applications: RwLock<HashMap<String, Application>>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self {
            applications: RwLock::new(HashMap::new()),
        }
    }

    /// Seed an application, e.g. one submitted through the public site.
    pub async fn insert_application(&self, application: Application) {
        let mut applications = self.applications.write().await;
        applications.insert(application.id.clone(), application);
    }
}

impl Default for MemoryApplicationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn get_application(&self, id: &str) -> ProviderResult<Option<Application>> {
        let applications = self.applications.read().await;
        Ok(applications.get(id).cloned())
    }

    async fn update_application(
        &self,
        id: &str,
        patch: &ApplicationPatch,
    ) -> ProviderResult<Application> {
        let mut applications = self.applications.write().await;
        let application = applications.get_mut(id).ok_or(ProviderError::NotFound)?;
        patch.apply(application);
        Ok(application.clone())
    }

    async fn query_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> ProviderResult<Vec<Application>> {
        let applications = self.applications.read().await;
        Ok(applications
            .values()
            .filter(|application| filter.matches(application))
            .cloned()
            .collect())
    }
}
