use serde::{Deserialize, Serialize};

use super::identity::Identity;
use super::profile::{Profile, Role};

/// The process-local view of "who is signed in and what can they do".
///
/// Owned exclusively by the session manager; callers only ever see cloned
/// snapshots. `loading` is true while a profile fetch for the current
/// identity is still in flight.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub identity: Option<Identity>,
    pub profile: Option<Profile>,
    pub loading: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// False whenever no profile is loaded, otherwise role membership.
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.profile
            .as_ref()
            .map(|profile| profile.has_role(allowed))
            .unwrap_or(false)
    }

    pub fn is_verified(&self) -> bool {
        self.profile
            .as_ref()
            .map(|profile| profile.is_verified)
            .unwrap_or(false)
    }

    pub fn is_approved(&self) -> bool {
        self.profile
            .as_ref()
            .map(|profile| profile.is_approved())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::profile::ProfileStatus;

    fn session_with_profile(role: Role, status: ProfileStatus, verified: bool) -> Session {
        let mut profile = Profile::new("id_1", "abena@example.com", "Abena", role);
        profile.status = status;
        profile.is_verified = verified;
        Session {
            identity: Some(Identity {
                id: "id_1".to_string(),
                email: "abena@example.com".to_string(),
                display_name: Some("Abena".to_string()),
                email_verified: verified,
            }),
            profile: Some(profile),
            loading: false,
        }
    }

    #[test]
    fn test_empty_session_denies_everything() {
        let session = Session::default();

        assert!(!session.is_authenticated());
        assert!(!session.has_role(&[Role::Admin]));
        assert!(!session.is_verified());
        assert!(!session.is_approved());
    }

    #[test]
    fn test_has_role_is_exact_membership() {
        let session = session_with_profile(Role::Staff, ProfileStatus::Active, true);

        assert!(session.has_role(&[Role::Staff]));
        assert!(session.has_role(&[Role::Admin, Role::Staff]));
        assert!(!session.has_role(&[Role::Admin]));
        assert!(!session.has_role(&[]));
    }

    #[test]
    fn test_is_approved_covers_both_states() {
        assert!(session_with_profile(Role::HomeOwner, ProfileStatus::Approved, true).is_approved());
        assert!(session_with_profile(Role::HomeOwner, ProfileStatus::Active, true).is_approved());
        assert!(!session_with_profile(Role::HomeOwner, ProfileStatus::Pending, true).is_approved());
    }

    #[test]
    fn test_identity_without_profile_has_no_role() {
        let mut session = session_with_profile(Role::Admin, ProfileStatus::Active, true);
        session.profile = None;

        assert!(session.is_authenticated());
        assert!(!session.has_role(&[Role::Admin]));
    }
}
