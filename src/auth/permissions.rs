use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::auth::ActionSet;
use crate::entities::{menu, module, permission, prelude::*, role, user, user_permission};
use crate::error::{AccessError, AccessResult, EntityKind};

/// Combines a role's grant on a menu with the user's override for that menu.
///
/// An override row is the authority of record for its (user, menu) pair and
/// replaces the role's set outright; without one the role's set stands.
pub fn effective_actions(
    role_grant: Option<&ActionSet>,
    user_override: Option<&ActionSet>,
) -> ActionSet {
    match user_override {
        Some(actions) => actions.clone(),
        None => role_grant.cloned().unwrap_or_default(),
    }
}

#[derive(Clone)]
pub struct PermissionService {
    db: DatabaseConnection,
}

impl PermissionService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Effective actions a user holds on one menu.
    pub async fn resolve_actions(&self, user_id: i32, menu_id: i32) -> AccessResult<ActionSet> {
        let (user, user_role) = self.active_user(user_id).await?;
        let target_menu = self.active_menu(menu_id).await?;

        let role_grant = match user_role.filter(|role| role.is_active) {
            Some(role) => Permission::find()
                .filter(permission::Column::RoleId.eq(role.id))
                .filter(permission::Column::MenuId.eq(target_menu.id))
                .one(&self.db)
                .await?
                .map(|row| row.actions),
            None => None,
        };

        let user_override = UserPermission::find()
            .filter(user_permission::Column::UserId.eq(user.id))
            .filter(user_permission::Column::MenuId.eq(target_menu.id))
            .one(&self.db)
            .await?
            .map(|row| row.actions);

        let actions = effective_actions(role_grant.as_ref(), user_override.as_ref());
        debug!(
            user_id,
            menu_id,
            overridden = user_override.is_some(),
            %actions,
            "resolved actions"
        );
        Ok(actions)
    }

    /// Effective actions for every active menu, keyed by menu row id.
    pub async fn resolve_all(&self, user_id: i32) -> AccessResult<BTreeMap<i32, ActionSet>> {
        let (user, user_role) = self.active_user(user_id).await?;

        let menus = Menu::find()
            .inner_join(Module)
            .filter(menu::Column::IsActive.eq(true))
            .filter(module::Column::IsActive.eq(true))
            .all(&self.db)
            .await?;

        let role_grants: HashMap<i32, ActionSet> = match user_role.filter(|role| role.is_active) {
            Some(role) => Permission::find()
                .filter(permission::Column::RoleId.eq(role.id))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|row| (row.menu_id, row.actions))
                .collect(),
            None => HashMap::new(),
        };

        let overrides: HashMap<i32, ActionSet> = UserPermission::find()
            .filter(user_permission::Column::UserId.eq(user.id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (row.menu_id, row.actions))
            .collect();

        Ok(menus
            .into_iter()
            .map(|m| {
                let actions = effective_actions(role_grants.get(&m.id), overrides.get(&m.id));
                (m.id, actions)
            })
            .collect())
    }

    pub async fn has_action(&self, user_id: i32, menu_id: i32, action: &str) -> AccessResult<bool> {
        let actions = self.resolve_actions(user_id, menu_id).await?;
        Ok(actions.contains(action))
    }

    /// Looks a menu up by its code, without checking whether it is active.
    pub async fn menu_by_code(&self, code: &str) -> AccessResult<menu::Model> {
        Menu::find()
            .filter(menu::Column::MenuId.eq(code))
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Menu, code))
    }

    /// Replaces the role's action set on a menu.
    pub async fn set_role_permission(
        &self,
        role_id: i32,
        menu_id: i32,
        actions: ActionSet,
    ) -> AccessResult<permission::Model> {
        let txn = self.db.begin().await?;
        ensure_role(&txn, role_id).await?;
        ensure_menu(&txn, menu_id).await?;

        let grant = permission::ActiveModel {
            role_id: Set(role_id),
            menu_id: Set(menu_id),
            actions: Set(actions),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let row = Permission::insert(grant)
            .on_conflict(
                OnConflict::columns([permission::Column::RoleId, permission::Column::MenuId])
                    .update_columns([permission::Column::Actions, permission::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_with_returning(&txn)
            .await?;

        txn.commit().await?;
        info!(role_id, menu_id, actions = %row.actions, "role permission set");
        Ok(row)
    }

    /// Adds tokens to the role's action set on a menu, creating the row if needed.
    pub async fn add_role_actions(
        &self,
        role_id: i32,
        menu_id: i32,
        actions: &[&str],
    ) -> AccessResult<permission::Model> {
        let txn = self.db.begin().await?;
        ensure_role(&txn, role_id).await?;
        ensure_menu(&txn, menu_id).await?;

        let existing = Permission::find()
            .filter(permission::Column::RoleId.eq(role_id))
            .filter(permission::Column::MenuId.eq(menu_id))
            .one(&txn)
            .await?;

        let row = if let Some(existing) = existing {
            let mut merged = existing.actions.clone();
            for action in actions {
                merged.insert(*action);
            }
            let mut active_model: permission::ActiveModel = existing.into();
            active_model.actions = Set(merged);
            active_model.updated_at = Set(Utc::now().into());
            active_model.update(&txn).await?
        } else {
            let new_permission = permission::ActiveModel {
                role_id: Set(role_id),
                menu_id: Set(menu_id),
                actions: Set(actions.iter().copied().collect()),
                created_at: Set(Utc::now().into()),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            };
            new_permission.insert(&txn).await?
        };

        txn.commit().await?;
        info!(role_id, menu_id, actions = %row.actions, "role actions added");
        Ok(row)
    }

    /// Removes tokens from the role's action set on a menu. The row is kept even
    /// when it ends up empty; `None` means the role has no row for the menu.
    pub async fn remove_role_actions(
        &self,
        role_id: i32,
        menu_id: i32,
        actions: &[&str],
    ) -> AccessResult<Option<permission::Model>> {
        let txn = self.db.begin().await?;
        ensure_role(&txn, role_id).await?;
        ensure_menu(&txn, menu_id).await?;

        let Some(existing) = Permission::find()
            .filter(permission::Column::RoleId.eq(role_id))
            .filter(permission::Column::MenuId.eq(menu_id))
            .one(&txn)
            .await?
        else {
            return Ok(None);
        };

        let mut remaining = existing.actions.clone();
        for action in actions {
            remaining.remove(action);
        }

        let mut active_model: permission::ActiveModel = existing.into();
        active_model.actions = Set(remaining);
        active_model.updated_at = Set(Utc::now().into());
        let row = active_model.update(&txn).await?;

        txn.commit().await?;
        info!(role_id, menu_id, actions = %row.actions, "role actions removed");
        Ok(Some(row))
    }

    /// Deletes the role's row for a menu. Returns whether a row existed.
    pub async fn revoke_role_permission(&self, role_id: i32, menu_id: i32) -> AccessResult<bool> {
        let txn = self.db.begin().await?;
        ensure_role(&txn, role_id).await?;
        ensure_menu(&txn, menu_id).await?;

        let result = Permission::delete_many()
            .filter(permission::Column::RoleId.eq(role_id))
            .filter(permission::Column::MenuId.eq(menu_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(role_id, menu_id, removed = result.rows_affected, "role permission revoked");
        Ok(result.rows_affected > 0)
    }

    /// Sets the user's override on a menu; it replaces the role's grant there.
    pub async fn grant_user_permission(
        &self,
        user_id: i32,
        menu_id: i32,
        actions: ActionSet,
    ) -> AccessResult<user_permission::Model> {
        let txn = self.db.begin().await?;
        ensure_user(&txn, user_id).await?;
        ensure_menu(&txn, menu_id).await?;

        let grant = user_permission::ActiveModel {
            user_id: Set(user_id),
            menu_id: Set(menu_id),
            actions: Set(actions),
            created_at: Set(Utc::now().into()),
            updated_at: Set(Utc::now().into()),
            ..Default::default()
        };
        let row = UserPermission::insert(grant)
            .on_conflict(
                OnConflict::columns([
                    user_permission::Column::UserId,
                    user_permission::Column::MenuId,
                ])
                .update_columns([
                    user_permission::Column::Actions,
                    user_permission::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_with_returning(&txn)
            .await?;

        txn.commit().await?;
        info!(user_id, menu_id, actions = %row.actions, "user permission granted");
        Ok(row)
    }

    /// Drops the user's override so the pair defers to the role again.
    pub async fn revoke_user_permission(&self, user_id: i32, menu_id: i32) -> AccessResult<bool> {
        let txn = self.db.begin().await?;
        ensure_user(&txn, user_id).await?;
        ensure_menu(&txn, menu_id).await?;

        let result = UserPermission::delete_many()
            .filter(user_permission::Column::UserId.eq(user_id))
            .filter(user_permission::Column::MenuId.eq(menu_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        info!(user_id, menu_id, removed = result.rows_affected, "user permission revoked");
        Ok(result.rows_affected > 0)
    }

    async fn active_user(&self, user_id: i32) -> AccessResult<(user::Model, Option<role::Model>)> {
        let (found_user, user_role) = User::find_by_id(user_id)
            .find_also_related(Role)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::User, user_id))?;

        if !found_user.is_active {
            return Err(AccessError::inactive(EntityKind::User, user_id));
        }
        Ok((found_user, user_role))
    }

    /// A menu counts as active only while its module is active too.
    async fn active_menu(&self, menu_id: i32) -> AccessResult<menu::Model> {
        let (found_menu, parent_module) = Menu::find_by_id(menu_id)
            .find_also_related(Module)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccessError::not_found(EntityKind::Menu, menu_id))?;

        let module_active = parent_module.is_some_and(|m| m.is_active);
        if !found_menu.is_active || !module_active {
            return Err(AccessError::inactive(EntityKind::Menu, menu_id));
        }
        Ok(found_menu)
    }
}

async fn ensure_role(db: &impl ConnectionTrait, role_id: i32) -> AccessResult<()> {
    match Role::find_by_id(role_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AccessError::not_found(EntityKind::Role, role_id)),
    }
}

async fn ensure_user(db: &impl ConnectionTrait, user_id: i32) -> AccessResult<()> {
    match User::find_by_id(user_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AccessError::not_found(EntityKind::User, user_id)),
    }
}

async fn ensure_menu(db: &impl ConnectionTrait, menu_id: i32) -> AccessResult<()> {
    match Menu::find_by_id(menu_id).one(db).await? {
        Some(_) => Ok(()),
        None => Err(AccessError::not_found(EntityKind::Menu, menu_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_role_grant() {
        let role: ActionSet = ["new", "view", "edit", "delete"].into_iter().collect();
        let user: ActionSet = ["view"].into_iter().collect();

        assert_eq!(effective_actions(Some(&role), Some(&user)), user);
        assert_eq!(effective_actions(Some(&role), None), role);
        assert!(effective_actions(None, None).is_empty());
    }

    #[test]
    fn empty_override_still_wins() {
        let role: ActionSet = ["view"].into_iter().collect();
        assert!(effective_actions(Some(&role), Some(&ActionSet::new())).is_empty());
    }
}
