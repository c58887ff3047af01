pub mod factory;
pub mod target;

pub use factory::{LoadingStats, ServiceProviderFactory, MERGED_SERVICES};
pub use target::LoadTarget;
