use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application-level account roles. Closed set; authorization decisions
/// only ever read this field, never a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    HomeOwner,
    Artisan,
    Admin,
    Staff,
    EstateManager,
    Tenant,
}

impl Role {
    /// Canonical mapping from loosely formatted role labels.
    ///
    /// Every place that turns external text into a role goes through here;
    /// there is deliberately no other normalization site.
    pub fn parse(label: &str) -> Option<Role> {
        let canonical: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match canonical.as_str() {
            "home_owner" | "homeowner" => Some(Role::HomeOwner),
            "artisan" => Some(Role::Artisan),
            "admin" | "administrator" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "estate_manager" | "estatemanager" => Some(Role::EstateManager),
            "tenant" => Some(Role::Tenant),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HomeOwner => "home_owner",
            Role::Artisan => "artisan",
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::EstateManager => "estate_manager",
            Role::Tenant => "tenant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Pending,
    Approved,
    Active,
    Suspended,
    Inactive,
}

impl ProfileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileStatus::Pending => "pending",
            ProfileStatus::Approved => "approved",
            ProfileStatus::Active => "active",
            ProfileStatus::Suspended => "suspended",
            ProfileStatus::Inactive => "inactive",
        }
    }

    /// Approved accounts may act; `Active` is the post-first-login state.
    pub fn is_approved(&self) -> bool {
        matches!(self, ProfileStatus::Approved | ProfileStatus::Active)
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role-specific attributes carried by a profile and copied verbatim from
/// an application's submitted fields during promotion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDetails {
    pub phone: Option<String>,
    pub company: Option<String>,
    pub experience: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Application-level account record, one-to-one with a provider identity.
///
/// `id` always equals the owning identity's id. Profiles are never deleted
/// in normal operation; accounts are disabled through `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub status: ProfileStatus,
    pub is_verified: bool,
    /// Human-readable label shown in admin views; authorization ignores it
    pub display_role: Option<String>,
    #[serde(flatten)]
    pub details: ProfileDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a profile in the default self-registration state.
    pub fn new(id: &str, email: &str, display_name: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_owned(),
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            role,
            status: ProfileStatus::Pending,
            is_verified: false,
            display_role: None,
            details: ProfileDetails::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }

    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial profile update applied through the profile store.
///
/// There is intentionally no `role` field here: a role changes only through
/// an explicit administrative action, never as a side effect of a profile
/// edit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub status: Option<ProfileStatus>,
    pub is_verified: Option<bool>,
    pub display_role: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub experience: Option<String>,
    pub id_type: Option<String>,
    pub id_number: Option<String>,
    pub skills: Option<Vec<String>>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

impl ProfilePatch {
    /// Apply the patch in place, refreshing `updated_at`.
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(ref display_name) = self.display_name {
            profile.display_name = display_name.clone();
        }
        if let Some(status) = self.status {
            profile.status = status;
        }
        if let Some(is_verified) = self.is_verified {
            profile.is_verified = is_verified;
        }
        if let Some(ref display_role) = self.display_role {
            profile.display_role = Some(display_role.clone());
        }
        if let Some(ref phone) = self.phone {
            profile.details.phone = Some(phone.clone());
        }
        if let Some(ref company) = self.company {
            profile.details.company = Some(company.clone());
        }
        if let Some(ref experience) = self.experience {
            profile.details.experience = Some(experience.clone());
        }
        if let Some(ref id_type) = self.id_type {
            profile.details.id_type = Some(id_type.clone());
        }
        if let Some(ref id_number) = self.id_number {
            profile.details.id_number = Some(id_number.clone());
        }
        if let Some(ref skills) = self.skills {
            profile.details.skills = skills.clone();
        }
        if let Some(ref bio) = self.bio {
            profile.details.bio = Some(bio.clone());
        }
        if let Some(ref location) = self.location {
            profile.details.location = Some(location.clone());
        }
        profile.touch();
    }
}

/// Filter for profile queries
#[derive(Debug, Clone, Default)]
pub struct ProfileFilter {
    pub role: Option<Role>,
    pub status: Option<ProfileStatus>,
    pub is_verified: Option<bool>,
}

impl ProfileFilter {
    pub fn matches(&self, profile: &Profile) -> bool {
        if let Some(role) = self.role {
            if profile.role != role {
                return false;
            }
        }
        if let Some(status) = self.status {
            if profile.status != status {
                return false;
            }
        }
        if let Some(is_verified) = self.is_verified {
            if profile.is_verified != is_verified {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_canonical_forms() {
        assert_eq!(Role::parse("home_owner"), Some(Role::HomeOwner));
        assert_eq!(Role::parse("Home Owner"), Some(Role::HomeOwner));
        assert_eq!(Role::parse("HOMEOWNER"), Some(Role::HomeOwner));
        assert_eq!(Role::parse("estate-manager"), Some(Role::EstateManager));
        assert_eq!(Role::parse("  admin "), Some(Role::Admin));
        assert_eq!(Role::parse("administrator"), Some(Role::Admin));
        assert_eq!(Role::parse("tenant"), Some(Role::Tenant));
        assert_eq!(Role::parse("landlord"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_round_trips_through_as_str() {
        for role in [
            Role::HomeOwner,
            Role::Artisan,
            Role::Admin,
            Role::Staff,
            Role::EstateManager,
            Role::Tenant,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_status_approval() {
        assert!(ProfileStatus::Approved.is_approved());
        assert!(ProfileStatus::Active.is_approved());
        assert!(!ProfileStatus::Pending.is_approved());
        assert!(!ProfileStatus::Suspended.is_approved());
        assert!(!ProfileStatus::Inactive.is_approved());
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = Profile::new("id_1", "kofi@example.com", "Kofi", Role::HomeOwner);

        assert_eq!(profile.id, "id_1");
        assert_eq!(profile.status, ProfileStatus::Pending);
        assert!(!profile.is_verified);
        assert!(profile.display_role.is_none());
        assert!(profile.details.skills.is_empty());
    }

    #[test]
    fn test_patch_does_not_touch_unset_fields() {
        let mut profile = Profile::new("id_1", "kofi@example.com", "Kofi", Role::Artisan);
        profile.details.company = Some("Mensah Works".to_string());

        let patch = ProfilePatch {
            bio: Some("Carpenter".to_string()),
            ..Default::default()
        };
        patch.apply(&mut profile);

        assert_eq!(profile.details.bio.as_deref(), Some("Carpenter"));
        assert_eq!(profile.details.company.as_deref(), Some("Mensah Works"));
        assert_eq!(profile.display_name, "Kofi");
        assert_eq!(profile.role, Role::Artisan);
    }

    #[test]
    fn test_filter_matching() {
        let mut profile = Profile::new("id_1", "kofi@example.com", "Kofi", Role::Artisan);
        profile.is_verified = true;
        profile.status = ProfileStatus::Approved;

        let unverified = ProfileFilter {
            is_verified: Some(false),
            ..Default::default()
        };
        assert!(!unverified.matches(&profile));

        let approved_artisans = ProfileFilter {
            role: Some(Role::Artisan),
            status: Some(ProfileStatus::Approved),
            ..Default::default()
        };
        assert!(approved_artisans.matches(&profile));
    }
}
