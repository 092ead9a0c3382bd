pub mod common;
pub mod pagination;
pub mod subscription;

pub use common::*;
pub use pagination::*;
pub use subscription::*;
