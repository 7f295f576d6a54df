pub mod guards;
pub mod permissions;
pub mod types;

pub use guards::*;
pub use permissions::*;
pub use types::*;
