use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{department, prelude::*};
use crate::error::{AccessError, AccessResult, EntityKind};

#[derive(Clone)]
pub struct DepartmentService {
    db: DatabaseConnection,
}

impl DepartmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an active department
    pub async fn create(&self, name: &str) -> AccessResult<department::Model> {
        let new_department = department::ActiveModel {
            name: Set(name.to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let created = new_department.insert(&self.db).await?;
        info!(department_id = created.id, name, "department created");
        Ok(created)
    }

    /// Rename a department
    pub async fn update(&self, department_id: i32, name: &str) -> AccessResult<department::Model> {
        let existing = self.find(department_id).await?;

        let mut active_model: department::ActiveModel = existing.into();
        active_model.name = Set(name.to_string());
        active_model.updated_at = Set(Utc::now().into());

        Ok(active_model.update(&self.db).await?)
    }

    /// Get department by ID
    pub async fn find(&self, department_id: i32) -> AccessResult<department::Model> {
        Department::find_by_id(department_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Department, department_id))
    }

    /// List active departments ordered by name
    pub async fn list_active(&self) -> AccessResult<Vec<department::Model>> {
        Ok(Department::find()
            .filter(department::Column::IsActive.eq(true))
            .order_by_asc(department::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Soft delete; users keep their reference
    pub async fn deactivate(&self, department_id: i32) -> AccessResult<department::Model> {
        let existing = self.find(department_id).await?;

        let mut active_model: department::ActiveModel = existing.into();
        active_model.is_active = Set(false);
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        info!(department_id, "department deactivated");
        Ok(updated)
    }
}
