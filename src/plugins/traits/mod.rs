pub mod notifier;
pub mod source;

pub use notifier::{NotifierPlugin, NotificationResult};
pub use source::AvailabilitySource;
