//! `SeaORM` Entity, Menu

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum MenuType {
    #[sea_orm(string_value = "Master")]
    Master,
    #[sea_orm(string_value = "Transaction")]
    Transaction,
    #[sea_orm(string_value = "Report")]
    Report,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "menu")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Code of the parent menu; `None` for menus directly under the module.
    pub parent_code: Option<String>,
    pub module_id: i32,
    pub name: String,
    pub menu_type: MenuType,
    /// Stable code the UI and guards address the menu by.
    #[sea_orm(unique)]
    pub menu_id: String,
    pub order_by: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::module::Entity",
        from = "Column::ModuleId",
        to = "super::module::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Module,
    #[sea_orm(has_many = "super::permission::Entity")]
    Permission,
    #[sea_orm(has_many = "super::user_permission::Entity")]
    UserPermission,
}

impl Related<super::module::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Module.def()
    }
}

impl Related<super::permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permission.def()
    }
}

impl Related<super::user_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPermission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
