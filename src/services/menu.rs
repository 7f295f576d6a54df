use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, warn};

use crate::entities::{menu, menu::MenuType, module, prelude::*};
use crate::error::{AccessError, AccessResult, EntityKind};

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub module_id: i32,
    pub parent_code: Option<String>,
    pub code: String,
    pub name: String,
    pub menu_type: MenuType,
    pub order_by: i32,
}

#[derive(Debug, Clone, Default)]
pub struct MenuUpdate {
    pub name: Option<String>,
    pub menu_type: Option<MenuType>,
    pub order_by: Option<i32>,
    /// `Some(None)` moves the menu to the top level of its module.
    pub parent_code: Option<Option<String>>,
}

#[derive(Clone)]
pub struct MenuService {
    db: DatabaseConnection,
}

impl MenuService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an active menu under an existing module
    pub async fn create(&self, input: NewMenu) -> AccessResult<menu::Model> {
        if Module::find_by_id(input.module_id).one(&self.db).await?.is_none() {
            return Err(AccessError::not_found(EntityKind::Module, input.module_id));
        }

        let new_menu = menu::ActiveModel {
            parent_code: Set(input.parent_code),
            module_id: Set(input.module_id),
            name: Set(input.name),
            menu_type: Set(input.menu_type),
            menu_id: Set(input.code),
            order_by: Set(input.order_by),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let created = new_menu.insert(&self.db).await?;
        info!(menu = %created.menu_id, module_id = created.module_id, "menu created");
        Ok(created)
    }

    pub async fn update(&self, id: i32, input: MenuUpdate) -> AccessResult<menu::Model> {
        let existing = self.find(id).await?;

        let mut active_model: menu::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(menu_type) = input.menu_type {
            active_model.menu_type = Set(menu_type);
        }
        if let Some(order_by) = input.order_by {
            active_model.order_by = Set(order_by);
        }
        if let Some(parent_code) = input.parent_code {
            active_model.parent_code = Set(parent_code);
        }
        active_model.updated_at = Set(Utc::now().into());

        Ok(active_model.update(&self.db).await?)
    }

    /// Get menu by ID
    pub async fn find(&self, id: i32) -> AccessResult<menu::Model> {
        Menu::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Menu, id))
    }

    /// Get menu by its code
    pub async fn find_by_code(&self, code: &str) -> AccessResult<menu::Model> {
        Menu::find()
            .filter(menu::Column::MenuId.eq(code))
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Menu, code))
    }

    /// Active menus of a module, ordered by `order_by`. Empty when the module
    /// itself is inactive.
    pub async fn list_for_module(&self, module_id: i32) -> AccessResult<Vec<menu::Model>> {
        Ok(Menu::find()
            .inner_join(Module)
            .filter(menu::Column::ModuleId.eq(module_id))
            .filter(menu::Column::IsActive.eq(true))
            .filter(module::Column::IsActive.eq(true))
            .order_by_asc(menu::Column::OrderBy)
            .order_by_asc(menu::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Every active menu under an active module, grouped by module order then menu order.
    pub async fn list_active(&self) -> AccessResult<Vec<menu::Model>> {
        Ok(Menu::find()
            .inner_join(Module)
            .filter(menu::Column::IsActive.eq(true))
            .filter(module::Column::IsActive.eq(true))
            .order_by_asc(module::Column::OrderBy)
            .order_by_asc(menu::Column::ModuleId)
            .order_by_asc(menu::Column::OrderBy)
            .order_by_asc(menu::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Soft delete; every later authorization against the menu denies
    pub async fn deactivate(&self, id: i32) -> AccessResult<menu::Model> {
        self.set_active(id, false).await
    }

    pub async fn activate(&self, id: i32) -> AccessResult<menu::Model> {
        self.set_active(id, true).await
    }

    /// Hard delete; role and user permission rows on the menu are removed with it.
    pub async fn purge(&self, id: i32) -> AccessResult<()> {
        let result = Menu::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AccessError::not_found(EntityKind::Menu, id));
        }
        warn!(menu_id = id, "menu purged");
        Ok(())
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AccessResult<menu::Model> {
        let existing = self.find(id).await?;

        let mut active_model: menu::ActiveModel = existing.into();
        active_model.is_active = Set(is_active);
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        info!(menu = %updated.menu_id, is_active, "menu status changed");
        Ok(updated)
    }
}
