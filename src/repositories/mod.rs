pub mod memory;
pub mod query;
pub mod subscription_repository;

pub use memory::InMemorySubscriptionRepository;
pub use subscription_repository::{SeaOrmSubscriptionRepository, SubscriptionRepository};
