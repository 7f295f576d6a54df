use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{info, warn};

use crate::entities::{prelude::*, role};
use crate::error::{AccessError, AccessResult, EntityKind};

#[derive(Clone)]
pub struct RoleService {
    db: DatabaseConnection,
}

impl RoleService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an active role; the name must be unique
    pub async fn create(&self, name: &str, display_name: &str) -> AccessResult<role::Model> {
        let new_role = role::ActiveModel {
            name: Set(name.to_string()),
            display_name: Set(display_name.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let created = new_role.insert(&self.db).await?;
        info!(role_id = created.id, name, "role created");
        Ok(created)
    }

    /// Rename a role or change its display name
    pub async fn update(
        &self,
        role_id: i32,
        name: Option<String>,
        display_name: Option<String>,
    ) -> AccessResult<role::Model> {
        let existing = self.find(role_id).await?;

        let mut active_model: role::ActiveModel = existing.into();
        if let Some(name) = name {
            active_model.name = Set(name);
        }
        if let Some(display_name) = display_name {
            active_model.display_name = Set(display_name);
        }
        active_model.updated_at = Set(Utc::now().into());

        Ok(active_model.update(&self.db).await?)
    }

    /// Get role by ID, active or not
    pub async fn find(&self, role_id: i32) -> AccessResult<role::Model> {
        Role::find_by_id(role_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Role, role_id))
    }

    /// Get role by its unique name
    pub async fn find_by_name(&self, name: &str) -> AccessResult<role::Model> {
        Role::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Role, name))
    }

    /// List active roles ordered by name
    pub async fn list_active(&self) -> AccessResult<Vec<role::Model>> {
        Ok(Role::find()
            .filter(role::Column::IsActive.eq(true))
            .order_by_asc(role::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Soft delete; the role stops granting anything
    pub async fn deactivate(&self, role_id: i32) -> AccessResult<role::Model> {
        self.set_active(role_id, false).await
    }

    /// Reactivate a soft-deleted role
    pub async fn activate(&self, role_id: i32) -> AccessResult<role::Model> {
        self.set_active(role_id, true).await
    }

    /// Hard delete. Permission rows of the role go with it and users holding
    /// the role are left without one.
    pub async fn purge(&self, role_id: i32) -> AccessResult<()> {
        let result = Role::delete_by_id(role_id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AccessError::not_found(EntityKind::Role, role_id));
        }
        warn!(role_id, "role purged");
        Ok(())
    }

    async fn set_active(&self, role_id: i32, is_active: bool) -> AccessResult<role::Model> {
        let existing = self.find(role_id).await?;

        let mut active_model: role::ActiveModel = existing.into();
        active_model.is_active = Set(is_active);
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        info!(role_id, is_active, "role status changed");
        Ok(updated)
    }
}
