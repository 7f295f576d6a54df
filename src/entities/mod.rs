//! `SeaORM` entities for the access-control schema

pub mod prelude;

pub mod department;
pub mod menu;
pub mod module;
pub mod permission;
pub mod role;
pub mod user;
pub mod user_permission;
