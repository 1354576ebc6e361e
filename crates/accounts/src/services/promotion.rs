//! Application review and account provisioning.
//!
//! Approval turns a pending application into a live identity/profile pair.
//! The same provisioning shape backs direct Staff and Estate-Manager
//! account creation, which has no application record.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use hearthside_config::AppConfig;

use crate::entities::{
    ApplicationKind, ApplicationPatch, ApplicationStatus, Profile, ProfileDetails, ProfileStatus,
    Role,
};
use crate::services::notification_hub::NotificationHub;
use crate::stores::{ApplicationStore, CredentialProvider, ProfileStore};
use crate::types::{
    NewAccountRequest, ProvisionedAccount, ReviewDecision, ReviewError, ReviewOutcome,
    ReviewResult,
};
use crate::utils::secret;

/// Orchestrates application review and administrator-driven provisioning.
pub struct PromotionService {
    provider: Arc<dyn CredentialProvider>,
    profiles: Arc<dyn ProfileStore>,
    applications: Arc<dyn ApplicationStore>,
    hub: Arc<NotificationHub>,
    provider_timeout: Duration,
}

impl PromotionService {
    pub fn new(
        provider: Arc<dyn CredentialProvider>,
        profiles: Arc<dyn ProfileStore>,
        applications: Arc<dyn ApplicationStore>,
        hub: Arc<NotificationHub>,
        config: &AppConfig,
    ) -> Self {
        Self {
            provider,
            profiles,
            applications,
            hub,
            provider_timeout: config.provider.request_timeout(),
        }
    }

    /// Review a pending application.
    ///
    /// The application record is updated first, for approvals and
    /// rejections alike. A rejection stops there. An approval then
    /// provisions the account; if the credential provider rejects identity
    /// creation the application stays approved with no backing account and
    /// the error says so (`application_updated`), leaving recovery to the
    /// caller. Reset-mail failure never fails the operation.
    pub async fn review_application(
        &self,
        kind: ApplicationKind,
        application_id: &str,
        decision: ReviewDecision,
        reviewer_id: &str,
        notes: Option<String>,
    ) -> ReviewResult<ReviewOutcome> {
        let application = self
            .applications
            .get_application(application_id)
            .await
            .map_err(|err| ReviewError::Store(err.to_string()))?
            .filter(|application| application.kind == kind)
            .ok_or(ReviewError::ApplicationNotFound)?;

        // Optimistic guard: terminal applications are not re-reviewed.
        if application.status != ApplicationStatus::Pending {
            return Err(ReviewError::AlreadyReviewed(application.status));
        }

        let patch = ApplicationPatch {
            status: Some(decision.into()),
            reviewed_by: Some(reviewer_id.to_owned()),
            review_notes: notes,
        };
        let application = self
            .applications
            .update_application(application_id, &patch)
            .await
            .map_err(|err| ReviewError::Store(err.to_string()))?;

        self.hub.decrement_count(kind.count_category(), 1);
        info!(application_id, reviewer_id, decision = %decision, "application reviewed");

        if decision == ReviewDecision::Rejected {
            return Ok(ReviewOutcome {
                application,
                account: None,
            });
        }

        let submitted = application.submitted.clone();
        if submitted.email.trim().is_empty() || submitted.name.trim().is_empty() {
            return Err(ReviewError::Validation(
                "application is missing applicant email or name".to_string(),
            ));
        }

        let account = self
            .provision_account(
                &submitted.email,
                &submitted.name,
                kind.role(),
                None,
                &submitted.details,
                true,
            )
            .await?;

        Ok(ReviewOutcome {
            application,
            account: Some(account),
        })
    }

    /// Provision a Staff account directly.
    pub async fn add_staff_user(
        &self,
        request: NewAccountRequest,
    ) -> ReviewResult<ProvisionedAccount> {
        request.validate().map_err(ReviewError::Validation)?;
        let display_role = request.display_role.clone().unwrap_or_else(|| "Staff".to_string());
        self.provision_account(
            &request.email,
            &request.name,
            Role::Staff,
            Some(&display_role),
            &request.details,
            false,
        )
        .await
    }

    /// Provision an Estate-Manager account directly.
    pub async fn add_estate_manager(
        &self,
        request: NewAccountRequest,
    ) -> ReviewResult<ProvisionedAccount> {
        request.validate().map_err(ReviewError::Validation)?;
        let display_role = request
            .display_role
            .clone()
            .unwrap_or_else(|| "Estate Manager".to_string());
        self.provision_account(
            &request.email,
            &request.name,
            Role::EstateManager,
            Some(&display_role),
            &request.details,
            false,
        )
        .await
    }

    /// Shared provisioning shape: generate a temporary secret, create the
    /// identity, set its display name, persist the profile, then attempt
    /// the credential-reset mail.
    ///
    /// The generated secret is never surfaced; the account holder sets
    /// their own credentials through the reset flow.
    async fn provision_account(
        &self,
        email: &str,
        name: &str,
        role: Role,
        display_role: Option<&str>,
        details: &ProfileDetails,
        application_updated: bool,
    ) -> ReviewResult<ProvisionedAccount> {
        let temp_secret = secret::generate_temp_secret();

        let identity = match timeout(
            self.provider_timeout,
            self.provider.create_identity(email, &temp_secret),
        )
        .await
        {
            Ok(Ok(identity)) => identity,
            Ok(Err(err)) => {
                return Err(ReviewError::Provisioning {
                    reason: err.to_string(),
                    application_updated,
                })
            }
            Err(_) => {
                return Err(ReviewError::Provisioning {
                    reason: "credential provider timed out".to_string(),
                    application_updated,
                })
            }
        };

        let identity = match timeout(
            self.provider_timeout,
            self.provider.update_display_name(&identity.id, name),
        )
        .await
        {
            Ok(Ok(identity)) => identity,
            Ok(Err(err)) => {
                return Err(ReviewError::Provisioning {
                    reason: err.to_string(),
                    application_updated,
                })
            }
            Err(_) => {
                return Err(ReviewError::Provisioning {
                    reason: "credential provider timed out".to_string(),
                    application_updated,
                })
            }
        };

        let mut profile = Profile::new(&identity.id, email, name, role);
        profile.status = ProfileStatus::Approved;
        profile.is_verified = true;
        profile.display_role = display_role.map(str::to_owned);
        profile.details = details.clone();

        self.profiles
            .set_profile(&profile)
            .await
            .map_err(|err| ReviewError::Store(err.to_string()))?;

        let email_sent = match self.provider.send_credential_reset(email).await {
            Ok(()) => true,
            Err(err) => {
                warn!(email, error = %err, "credential reset delivery failed");
                false
            }
        };

        info!(identity_id = %identity.id, role = %role, email_sent, "account provisioned");
        Ok(ProvisionedAccount {
            identity,
            profile,
            email_sent,
        })
    }
}
