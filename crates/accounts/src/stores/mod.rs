//! External-collaborator seams.
//!
//! The credential provider and the two document stores are consumed behind
//! object-safe traits so services can be wired against the real backends in
//! production and against the in-process implementations in tests and
//! development.

pub mod memory;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::entities::{
    Application, ApplicationFilter, ApplicationPatch, Identity, IdentityEvent, Profile,
    ProfileFilter, ProfilePatch,
};
use crate::types::ProviderResult;

/// Issues and validates identities and delivers credential-reset messages.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Create a new identity for the given email and secret.
    async fn create_identity(&self, email: &str, secret: &str) -> ProviderResult<Identity>;

    /// Authenticate and make the identity current.
    async fn sign_in(&self, email: &str, secret: &str) -> ProviderResult<Identity>;

    /// Clear the current identity.
    async fn sign_out(&self) -> ProviderResult<()>;

    /// Set an identity's display name.
    async fn update_display_name(
        &self,
        identity_id: &str,
        display_name: &str,
    ) -> ProviderResult<Identity>;

    /// Send a credential-reset message to the given address.
    async fn send_credential_reset(&self, email: &str) -> ProviderResult<()>;

    /// Subscribe to identity-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<IdentityEvent>;
}

/// Document store keyed by identity id holding role/status/verification data.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, id: &str) -> ProviderResult<Option<Profile>>;

    async fn set_profile(&self, profile: &Profile) -> ProviderResult<()>;

    async fn update_profile(&self, id: &str, patch: &ProfilePatch) -> ProviderResult<Profile>;

    async fn query_profiles(&self, filter: &ProfileFilter) -> ProviderResult<Vec<Profile>>;
}

/// Store of pending Home-Owner/Artisan applications.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn get_application(&self, id: &str) -> ProviderResult<Option<Application>>;

    async fn update_application(
        &self,
        id: &str,
        patch: &ApplicationPatch,
    ) -> ProviderResult<Application>;

    async fn query_applications(
        &self,
        filter: &ApplicationFilter,
    ) -> ProviderResult<Vec<Application>>;
}
