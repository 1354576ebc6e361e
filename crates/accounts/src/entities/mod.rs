//! Domain entities for the accounts core.

pub mod application;
pub mod identity;
pub mod profile;
pub mod session;

pub use application::{
    Application, ApplicationFilter, ApplicationKind, ApplicationPatch, ApplicationStatus,
    SubmittedFields,
};
pub use identity::{Identity, IdentityEvent};
pub use profile::{Profile, ProfileDetails, ProfileFilter, ProfilePatch, ProfileStatus, Role};
pub use session::Session;
