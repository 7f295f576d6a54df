pub mod department;
pub mod hierarchy;
pub mod menu;
pub mod module;
pub mod navigation;
pub mod role;
pub mod user;

pub use department::*;
pub use menu::*;
pub use module::*;
pub use navigation::*;
pub use role::*;
pub use user::*;
