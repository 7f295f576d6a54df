pub use super::department::Entity as Department;
pub use super::menu::Entity as Menu;
pub use super::module::Entity as Module;
pub use super::permission::Entity as Permission;
pub use super::role::Entity as Role;
pub use super::user::Entity as User;
pub use super::user_permission::Entity as UserPermission;
