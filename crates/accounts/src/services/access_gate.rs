//! Role-based access decisions.
//!
//! The gate is pure: it looks at a session snapshot and returns a decision.
//! Navigation, redirects, and rendering are the caller's job, and nothing
//! is cached between evaluations.

use serde::{Deserialize, Serialize};

use crate::entities::{Role, Session};

/// What a protected action or route requires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// When set, the session's role must be one of these
    pub allowed_roles: Option<Vec<Role>>,
    pub require_verification: bool,
    pub require_approval: bool,
}

/// Why access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    Unauthenticated,
    ForbiddenRole,
    Unverified,
    Unapproved,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DenialReason::Unauthenticated => "unauthenticated",
            DenialReason::ForbiddenRole => "forbidden_role",
            DenialReason::Unverified => "unverified",
            DenialReason::Unapproved => "unapproved",
        };
        write!(f, "{reason}")
    }
}

/// Outcome of evaluating a gate against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// The session is still resolving; block and re-evaluate
    Pending,
    Allowed,
    Denied { reason: DenialReason },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }
}

/// A configured guard for one protected action or route.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    config: GateConfig,
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Gate that only checks for the given roles.
    pub fn allowing(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            config: GateConfig {
                allowed_roles: Some(roles.into_iter().collect()),
                ..Default::default()
            },
        }
    }

    pub fn require_verification(mut self) -> Self {
        self.config.require_verification = true;
        self
    }

    pub fn require_approval(mut self) -> Self {
        self.config.require_approval = true;
        self
    }

    /// Evaluate the gate against a session snapshot.
    ///
    /// Checks run in a fixed order: loading, authentication, role,
    /// verification, approval. The first failing check decides.
    pub fn evaluate(&self, session: &Session) -> GateDecision {
        if session.loading {
            return GateDecision::Pending;
        }

        if !session.is_authenticated() {
            return GateDecision::Denied {
                reason: DenialReason::Unauthenticated,
            };
        }

        if let Some(ref allowed) = self.config.allowed_roles {
            if !session.has_role(allowed) {
                return GateDecision::Denied {
                    reason: DenialReason::ForbiddenRole,
                };
            }
        }

        if self.config.require_verification && !session.is_verified() {
            return GateDecision::Denied {
                reason: DenialReason::Unverified,
            };
        }

        if self.config.require_approval && !session.is_approved() {
            return GateDecision::Denied {
                reason: DenialReason::Unapproved,
            };
        }

        GateDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Identity, Profile, ProfileStatus};

    fn session(role: Role, status: ProfileStatus, verified: bool) -> Session {
        let mut profile = Profile::new("id_1", "esi@example.com", "Esi", role);
        profile.status = status;
        profile.is_verified = verified;
        Session {
            identity: Some(Identity {
                id: "id_1".to_string(),
                email: "esi@example.com".to_string(),
                display_name: Some("Esi".to_string()),
                email_verified: verified,
            }),
            profile: Some(profile),
            loading: false,
        }
    }

    #[test]
    fn test_loading_session_is_pending() {
        let gate = AccessGate::allowing([Role::Admin]);
        let session = Session {
            loading: true,
            ..Default::default()
        };

        assert_eq!(gate.evaluate(&session), GateDecision::Pending);
    }

    #[test]
    fn test_unauthenticated_session_is_denied() {
        let gate = AccessGate::default();

        assert_eq!(
            gate.evaluate(&Session::default()),
            GateDecision::Denied {
                reason: DenialReason::Unauthenticated
            }
        );
    }

    #[test]
    fn test_staff_never_passes_admin_gate() {
        let gate = AccessGate::allowing([Role::Admin]);
        let session = session(Role::Staff, ProfileStatus::Active, true);

        assert_eq!(
            gate.evaluate(&session),
            GateDecision::Denied {
                reason: DenialReason::ForbiddenRole
            }
        );
    }

    #[test]
    fn test_verification_and_approval_requirements() {
        let gate = AccessGate::allowing([Role::Artisan])
            .require_verification()
            .require_approval();

        let unverified = session(Role::Artisan, ProfileStatus::Approved, false);
        assert_eq!(
            gate.evaluate(&unverified),
            GateDecision::Denied {
                reason: DenialReason::Unverified
            }
        );

        let unapproved = session(Role::Artisan, ProfileStatus::Pending, true);
        assert_eq!(
            gate.evaluate(&unapproved),
            GateDecision::Denied {
                reason: DenialReason::Unapproved
            }
        );

        let good = session(Role::Artisan, ProfileStatus::Active, true);
        assert!(gate.evaluate(&good).is_allowed());
    }

    #[test]
    fn test_role_check_precedes_verification_check() {
        // Fixed evaluation order: a wrong role wins over missing verification.
        let gate = AccessGate::allowing([Role::Admin]).require_verification();
        let session = session(Role::Tenant, ProfileStatus::Active, false);

        assert_eq!(
            gate.evaluate(&session),
            GateDecision::Denied {
                reason: DenialReason::ForbiddenRole
            }
        );
    }

    #[test]
    fn test_gate_without_requirements_allows_any_authenticated_session() {
        let gate = AccessGate::default();
        let mut session = session(Role::Tenant, ProfileStatus::Pending, false);

        assert!(gate.evaluate(&session).is_allowed());

        // even without a profile
        session.profile = None;
        assert!(gate.evaluate(&session).is_allowed());
    }

    #[test]
    fn test_re_evaluation_tracks_session_changes() {
        let gate = AccessGate::allowing([Role::Admin]);
        let mut session = session(Role::Admin, ProfileStatus::Active, true);

        assert!(gate.evaluate(&session).is_allowed());

        session.profile = None;
        session.identity = None;
        assert_eq!(
            gate.evaluate(&session),
            GateDecision::Denied {
                reason: DenialReason::Unauthenticated
            }
        );
    }
}
