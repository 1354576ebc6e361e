//! # Hearthside Accounts Crate
//!
//! Identity, session, and access-control management for the Hearthside
//! property platform, plus the promotion workflow that turns approved
//! applications into live accounts.
//!
//! ## Architecture
//!
//! - **Entities**: Domain models (Profile, Application, Identity, Session)
//! - **Services**: Business logic layer (session manager, access gate,
//!   promotion workflow, notification hub)
//! - **Stores**: External-collaborator seams plus in-process backends
//! - **Types**: Errors, requests, and responses
//! - **Utils**: Internal utilities
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use hearthside_accounts::{MemoryCredentialProvider, MemoryProfileStore, SessionManager};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = hearthside_config::load()?;
//! let provider = Arc::new(MemoryCredentialProvider::new());
//! let profiles = Arc::new(MemoryProfileStore::new());
//! let sessions = SessionManager::new(provider, profiles, &config);
//!
//! let (identity, profile) = sessions.sign_in("ama@example.com", "secret").await?;
//! assert_eq!(profile.map(|p| p.id), Some(identity.id));
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod services;
pub mod stores;
pub mod types;
pub mod utils;

// Re-export the main types for convenience
pub use entities::{
    Application, ApplicationFilter, ApplicationKind, ApplicationPatch, ApplicationStatus,
    Identity, IdentityEvent, Profile, ProfileDetails, ProfileFilter, ProfilePatch, ProfileStatus,
    Role, Session, SubmittedFields,
};
pub use services::{
    AccessGate, DenialReason, GateConfig, GateDecision, NotificationCounts, NotificationHub,
    NotificationService, PromotionService, SessionManager, Subscription,
};
pub use stores::memory::{
    MemoryApplicationStore, MemoryCredentialProvider, MemoryProfileStore,
};
pub use stores::{ApplicationStore, CredentialProvider, ProfileStore};
pub use types::{
    AuthError, AuthResult, NewAccountRequest, ProviderError, ProviderResult, ProvisionedAccount,
    ReviewDecision, ReviewError, ReviewOutcome, ReviewResult, SignUpRequest,
};
