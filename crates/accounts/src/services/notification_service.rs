//! Best-effort pending-count refresh from the stores.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::entities::{ApplicationFilter, ApplicationKind, ApplicationStatus, ProfileFilter};
use crate::services::notification_hub::{NotificationCounts, NotificationHub};
use crate::stores::{ApplicationStore, ProfileStore};

/// Category for profiles awaiting verification.
pub const PENDING_VERIFICATIONS: &str = "pending_verifications";

/// Pulls pending-application and pending-verification counts from the
/// stores and feeds them to the hub.
pub struct NotificationService {
    hub: Arc<NotificationHub>,
    profiles: Arc<dyn ProfileStore>,
    applications: Arc<dyn ApplicationStore>,
}

impl NotificationService {
    pub fn new(
        hub: Arc<NotificationHub>,
        profiles: Arc<dyn ProfileStore>,
        applications: Arc<dyn ApplicationStore>,
    ) -> Self {
        Self {
            hub,
            profiles,
            applications,
        }
    }

    pub fn hub(&self) -> Arc<NotificationHub> {
        self.hub.clone()
    }

    /// Refresh the count map from the stores.
    ///
    /// Best-effort: a failing store query is logged and the remaining
    /// categories still update. Never returns an error to callers.
    pub async fn fetch_notification_counts(&self) {
        let mut partial = NotificationCounts::new();

        for kind in [ApplicationKind::HomeOwner, ApplicationKind::Artisan] {
            let filter = ApplicationFilter {
                kind: Some(kind),
                status: Some(ApplicationStatus::Pending),
            };
            match self.applications.query_applications(&filter).await {
                Ok(applications) => {
                    partial.insert(kind.count_category().to_string(), applications.len() as u64);
                }
                Err(err) => {
                    warn!(kind = %kind, error = %err, "pending application count refresh failed");
                }
            }
        }

        let filter = ProfileFilter {
            is_verified: Some(false),
            ..Default::default()
        };
        match self.profiles.query_profiles(&filter).await {
            Ok(profiles) => {
                partial.insert(PENDING_VERIFICATIONS.to_string(), profiles.len() as u64);
            }
            Err(err) => {
                warn!(error = %err, "pending verification count refresh failed");
            }
        }

        if partial.is_empty() {
            debug!("no notification categories refreshed");
            return;
        }
        self.hub.update_counts(partial);
    }
}
