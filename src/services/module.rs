use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{module, prelude::*};
use crate::error::{AccessError, AccessResult, EntityKind};

#[derive(Debug, Clone)]
pub struct NewModule {
    pub code: String,
    pub name: String,
    pub path: String,
    pub order_by: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleUpdate {
    pub name: Option<String>,
    pub path: Option<String>,
    pub order_by: Option<i32>,
}

#[derive(Clone)]
pub struct ModuleService {
    db: DatabaseConnection,
}

impl ModuleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an active module under a unique code
    pub async fn create(&self, input: NewModule) -> AccessResult<module::Model> {
        let new_module = module::ActiveModel {
            module_id: Set(input.code),
            name: Set(input.name),
            path: Set(input.path),
            order_by: Set(input.order_by),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let created = new_module.insert(&self.db).await?;
        info!(module = %created.module_id, "module created");
        Ok(created)
    }

    /// Update name, path or ordering of a module
    pub async fn update(&self, id: i32, input: ModuleUpdate) -> AccessResult<module::Model> {
        let existing = self.find(id).await?;

        let mut active_model: module::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active_model.name = Set(name);
        }
        if let Some(path) = input.path {
            active_model.path = Set(path);
        }
        if let Some(order_by) = input.order_by {
            active_model.order_by = Set(order_by);
        }
        active_model.updated_at = Set(Utc::now().into());

        Ok(active_model.update(&self.db).await?)
    }

    /// Get module by ID
    pub async fn find(&self, id: i32) -> AccessResult<module::Model> {
        Module::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Module, id))
    }

    /// Get module by its code (e.g. `EXAM`)
    pub async fn find_by_code(&self, code: &str) -> AccessResult<module::Model> {
        Module::find()
            .filter(module::Column::ModuleId.eq(code))
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Module, code))
    }

    /// List active modules in display order
    pub async fn list_active(&self) -> AccessResult<Vec<module::Model>> {
        Ok(Module::find()
            .filter(module::Column::IsActive.eq(true))
            .order_by_asc(module::Column::OrderBy)
            .order_by_asc(module::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Soft delete; menus under the module stop resolving until it is reactivated.
    pub async fn deactivate(&self, id: i32) -> AccessResult<module::Model> {
        self.set_active(id, false).await
    }

    /// Reactivate a module and, with it, its active menus
    pub async fn activate(&self, id: i32) -> AccessResult<module::Model> {
        self.set_active(id, true).await
    }

    async fn set_active(&self, id: i32, is_active: bool) -> AccessResult<module::Model> {
        let existing = self.find(id).await?;

        let mut active_model: module::ActiveModel = existing.into();
        active_model.is_active = Set(is_active);
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        info!(module = %updated.module_id, is_active, "module status changed");
        Ok(updated)
    }
}
