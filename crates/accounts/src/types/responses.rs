//! Response types for the accounts core.

use serde::{Deserialize, Serialize};

use crate::entities::{Application, Identity, Profile};

/// An identity/profile pair created by provisioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionedAccount {
    pub identity: Identity,
    pub profile: Profile,
    /// False when the credential-reset mail could not be delivered; the
    /// account itself was still created.
    pub email_sent: bool,
}

/// Result of reviewing an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// The application record as written by the review
    pub application: Application,
    /// Present only for approvals
    pub account: Option<ProvisionedAccount>,
}

impl ReviewOutcome {
    pub fn email_sent(&self) -> bool {
        self.account
            .as_ref()
            .map(|account| account.email_sent)
            .unwrap_or(false)
    }
}
