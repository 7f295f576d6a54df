use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::{info, warn};

use crate::entities::{prelude::*, user};
use crate::error::{AccessError, AccessResult, EntityKind};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub mail: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: Option<i32>,
    pub department_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub mail: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an active user; referenced role and department must exist
    pub async fn create(&self, input: NewUser) -> AccessResult<user::Model> {
        if let Some(role_id) = input.role_id {
            self.ensure_role(role_id).await?;
        }
        if let Some(department_id) = input.department_id {
            self.ensure_department(department_id).await?;
        }

        let new_user = user::ActiveModel {
            username: Set(input.username),
            mail: Set(input.mail),
            role_id: Set(input.role_id),
            department_id: Set(input.department_id),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let created = new_user.insert(&self.db).await?;
        info!(user_id = created.id, username = %created.username, "user created");
        Ok(created)
    }

    /// Update contact and name fields of a user
    pub async fn update(&self, user_id: i32, input: UserUpdate) -> AccessResult<user::Model> {
        let existing = self.find(user_id).await?;

        let mut active_model: user::ActiveModel = existing.into();
        if let Some(mail) = input.mail {
            active_model.mail = Set(mail);
        }
        if let Some(first_name) = input.first_name {
            active_model.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active_model.last_name = Set(last_name);
        }
        active_model.updated_at = Set(Utc::now().into());

        Ok(active_model.update(&self.db).await?)
    }

    /// Assign a role, or clear it with `None`
    pub async fn assign_role(&self, user_id: i32, role_id: Option<i32>) -> AccessResult<user::Model> {
        if let Some(role_id) = role_id {
            self.ensure_role(role_id).await?;
        }
        let existing = self.find(user_id).await?;

        let mut active_model: user::ActiveModel = existing.into();
        active_model.role_id = Set(role_id);
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        info!(user_id, ?role_id, "user role assigned");
        Ok(updated)
    }

    /// Assign a department, or clear it with `None`
    pub async fn assign_department(
        &self,
        user_id: i32,
        department_id: Option<i32>,
    ) -> AccessResult<user::Model> {
        if let Some(department_id) = department_id {
            self.ensure_department(department_id).await?;
        }
        let existing = self.find(user_id).await?;

        let mut active_model: user::ActiveModel = existing.into();
        active_model.department_id = Set(department_id);
        active_model.updated_at = Set(Utc::now().into());

        Ok(active_model.update(&self.db).await?)
    }

    /// Get user by ID
    pub async fn find(&self, user_id: i32) -> AccessResult<user::Model> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::User, user_id))
    }

    /// Get user by username
    pub async fn find_by_username(&self, username: &str) -> AccessResult<user::Model> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::User, username))
    }

    /// Soft delete; the guard denies the user from now on
    pub async fn deactivate(&self, user_id: i32) -> AccessResult<user::Model> {
        self.set_active(user_id, false).await
    }

    /// Reactivate a soft-deleted user
    pub async fn activate(&self, user_id: i32) -> AccessResult<user::Model> {
        self.set_active(user_id, true).await
    }

    /// Hard delete; the user's permission overrides are removed with it.
    pub async fn purge(&self, user_id: i32) -> AccessResult<()> {
        let result = User::delete_by_id(user_id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AccessError::not_found(EntityKind::User, user_id));
        }
        warn!(user_id, "user purged");
        Ok(())
    }

    async fn set_active(&self, user_id: i32, is_active: bool) -> AccessResult<user::Model> {
        let existing = self.find(user_id).await?;

        let mut active_model: user::ActiveModel = existing.into();
        active_model.is_active = Set(is_active);
        active_model.updated_at = Set(Utc::now().into());

        let updated = active_model.update(&self.db).await?;
        info!(user_id, is_active, "user status changed");
        Ok(updated)
    }

    async fn ensure_role(&self, role_id: i32) -> AccessResult<()> {
        match Role::find_by_id(role_id).one(&self.db).await? {
            Some(_) => Ok(()),
            None => Err(AccessError::not_found(EntityKind::Role, role_id)),
        }
    }

    async fn ensure_department(&self, department_id: i32) -> AccessResult<()> {
        match Department::find_by_id(department_id).one(&self.db).await? {
            Some(_) => Ok(()),
            None => Err(AccessError::not_found(EntityKind::Department, department_id)),
        }
    }
}
