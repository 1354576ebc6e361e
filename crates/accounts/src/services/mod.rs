//! Business logic layer.

pub mod access_gate;
pub mod notification_hub;
pub mod notification_service;
pub mod promotion;
pub mod session_manager;

pub use access_gate::{AccessGate, DenialReason, GateConfig, GateDecision};
pub use notification_hub::{NotificationCounts, NotificationHub, Subscription};
pub use notification_service::NotificationService;
pub use promotion::PromotionService;
pub use session_manager::SessionManager;
