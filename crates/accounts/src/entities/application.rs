use chrono::{DateTime, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::profile::{ProfileDetails, Role};

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

/// The two application kinds accepted from the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    HomeOwner,
    Artisan,
}

impl ApplicationKind {
    /// Role granted to an approved applicant of this kind.
    pub fn role(&self) -> Role {
        match self {
            ApplicationKind::HomeOwner => Role::HomeOwner,
            ApplicationKind::Artisan => Role::Artisan,
        }
    }

    /// Category under which this kind's pending applications are counted.
    pub fn count_category(&self) -> &'static str {
        match self {
            ApplicationKind::HomeOwner => "home_owner_applications",
            ApplicationKind::Artisan => "artisan_applications",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationKind::HomeOwner => "home_owner",
            ApplicationKind::Artisan => "artisan",
        }
    }
}

impl std::fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Application status enumeration. Approved and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields the applicant filled in on the public form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedFields {
    pub name: String,
    pub email: String,
    #[serde(flatten)]
    pub details: ProfileDetails,
}

/// A prospective Home-Owner or Artisan account request awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub kind: ApplicationKind,
    pub submitted: SubmittedFields,
    pub status: ApplicationStatus,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl Application {
    /// Create a new pending application with a generated id.
    pub fn new(kind: ApplicationKind, submitted: SubmittedFields) -> Self {
        let now = Utc::now();
        Self {
            id: CUID.create_id(),
            kind,
            submitted,
            status: ApplicationStatus::Pending,
            reviewed_by: None,
            review_notes: None,
            submitted_at: now,
            last_updated: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApplicationStatus::Pending
    }
}

/// Partial update written back by the review workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
}

impl ApplicationPatch {
    /// Apply the patch in place, refreshing `last_updated`.
    pub fn apply(&self, application: &mut Application) {
        if let Some(status) = self.status {
            application.status = status;
        }
        if let Some(ref reviewed_by) = self.reviewed_by {
            application.reviewed_by = Some(reviewed_by.clone());
        }
        if let Some(ref review_notes) = self.review_notes {
            application.review_notes = Some(review_notes.clone());
        }
        application.last_updated = Utc::now();
    }
}

/// Filter for application queries
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub kind: Option<ApplicationKind>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn matches(&self, application: &Application) -> bool {
        if let Some(kind) = self.kind {
            if application.kind != kind {
                return false;
            }
        }
        if let Some(status) = self.status {
            if application.status != status {
                return false;
            }
        }
        true
    }
}
