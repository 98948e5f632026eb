//! Supporting services around the approval workflow: audit logging,
//! approver notification fan-out, campaign-wide progress rollup, and the
//! realtime board projection.

pub mod activity;
pub mod notifications;
pub mod progress;
pub mod projection;

pub use activity::ActivityLogger;
pub use notifications::NotificationDispatcher;
pub use progress::ProgressAggregator;
pub use projection::RealtimeProjection;
