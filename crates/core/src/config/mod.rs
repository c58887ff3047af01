pub mod configuration;
pub mod sources;
pub mod tree;
pub mod validation;

pub use configuration::*;
pub use sources::*;
pub use tree::*;
pub use validation::*;
