pub mod context;
pub mod health;
pub mod subscription;

pub use context::{REQUEST_ID_HEADER, RequestContext};
pub use health::health_config;
pub use subscription::subscription_config;
