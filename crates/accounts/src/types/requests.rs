//! Request types for the accounts core.

use serde::{Deserialize, Serialize};

use crate::entities::{ApplicationStatus, ProfileDetails, ProfileStatus, Role};
use crate::utils::validation;

/// Self-registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
    /// Overrides the default `pending` status when set
    pub status: Option<ProfileStatus>,
    #[serde(default)]
    pub details: ProfileDetails,
}

impl SignUpRequest {
    /// Validate the sign-up request
    pub fn validate(&self) -> Result<(), String> {
        validation::validate_email(&self.email)?;
        validation::validate_display_name(&self.display_name)?;
        if self.password.trim().is_empty() {
            return Err("Password cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Direct account provisioning request used for Staff and Estate-Manager
/// accounts, which have no preceding application record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccountRequest {
    pub email: String,
    pub name: String,
    /// Human-readable role label for admin views
    pub display_role: Option<String>,
    #[serde(default)]
    pub details: ProfileDetails,
}

impl NewAccountRequest {
    /// Validate the provisioning request
    pub fn validate(&self) -> Result<(), String> {
        validation::validate_email(&self.email)?;
        validation::validate_display_name(&self.name)?;
        Ok(())
    }
}

/// The administrator's verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ApplicationStatus {
    fn from(decision: ReviewDecision) -> Self {
        match decision {
            ReviewDecision::Approved => ApplicationStatus::Approved,
            ReviewDecision::Rejected => ApplicationStatus::Rejected,
        }
    }
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewDecision::Approved => write!(f, "approved"),
            ReviewDecision::Rejected => write!(f, "rejected"),
        }
    }
}
