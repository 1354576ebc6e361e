use serde::{Deserialize, Serialize};

/// Identity record owned by the credential provider.
///
/// Profiles reference identities by id and never copy credential data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-assigned identifier, shared with the owning profile
    pub id: String,
    /// Email address the identity authenticates with
    pub email: String,
    /// Display name as known to the provider
    pub display_name: Option<String>,
    /// Whether the provider has verified the email address
    pub email_verified: bool,
}

/// Broadcast by the credential provider whenever the authenticated
/// identity changes (sign-in, sign-out, token refresh).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IdentityEvent {
    SignedIn { identity: Identity },
    SignedOut,
}

impl IdentityEvent {
    /// The identity carried by the event, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityEvent::SignedIn { identity } => Some(identity),
            IdentityEvent::SignedOut => None,
        }
    }
}
