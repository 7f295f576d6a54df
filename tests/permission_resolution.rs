mod common;

use common::{actions, fixture, full_access, new_user};
use hrgate::entities::{permission, prelude::*, user_permission};
use hrgate::error::EntityKind;
use hrgate::services::{MenuService, ModuleService, RoleService, UserService};
use hrgate::{AccessError, PermissionService};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn role_grant_applies_without_override() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .set_role_permission(fx.role_id, fx.role_menu_id, full_access())
        .await
        .unwrap();

    let resolved = permissions
        .resolve_actions(fx.user_id, fx.role_menu_id)
        .await
        .unwrap();
    assert_eq!(resolved, actions(&["new", "view", "edit", "delete"]));

    // No row for the other menu: empty, not an error.
    let other = permissions
        .resolve_actions(fx.user_id, fx.user_menu_id)
        .await
        .unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn user_override_replaces_role_grant() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .set_role_permission(fx.role_id, fx.role_menu_id, full_access())
        .await
        .unwrap();
    permissions
        .grant_user_permission(fx.user_id, fx.role_menu_id, actions(&["view"]))
        .await
        .unwrap();

    let resolved = permissions
        .resolve_actions(fx.user_id, fx.role_menu_id)
        .await
        .unwrap();
    assert_eq!(resolved, actions(&["view"]));
}

#[tokio::test]
async fn override_can_grant_what_role_lacks() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .grant_user_permission(fx.user_id, fx.exam_menu_id, actions(&["view", "approve"]))
        .await
        .unwrap();

    let resolved = permissions
        .resolve_actions(fx.user_id, fx.exam_menu_id)
        .await
        .unwrap();
    assert_eq!(resolved, actions(&["approve", "view"]));
}

#[tokio::test]
async fn revoking_override_defers_to_role_again() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .set_role_permission(fx.role_id, fx.role_menu_id, actions(&["view", "edit"]))
        .await
        .unwrap();
    permissions
        .grant_user_permission(fx.user_id, fx.role_menu_id, actions(&[]))
        .await
        .unwrap();
    assert!(
        permissions
            .resolve_actions(fx.user_id, fx.role_menu_id)
            .await
            .unwrap()
            .is_empty()
    );

    assert!(permissions.revoke_user_permission(fx.user_id, fx.role_menu_id).await.unwrap());
    assert!(!permissions.revoke_user_permission(fx.user_id, fx.role_menu_id).await.unwrap());

    let resolved = permissions
        .resolve_actions(fx.user_id, fx.role_menu_id)
        .await
        .unwrap();
    assert_eq!(resolved, actions(&["edit", "view"]));
}

#[tokio::test]
async fn regranting_updates_the_single_override_row() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    let first = permissions
        .grant_user_permission(fx.user_id, fx.user_menu_id, actions(&["view"]))
        .await
        .unwrap();
    let second = permissions
        .grant_user_permission(fx.user_id, fx.user_menu_id, actions(&["view", "edit"]))
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.actions, actions(&["edit", "view"]));

    let rows = UserPermission::find()
        .filter(user_permission::Column::UserId.eq(fx.user_id))
        .filter(user_permission::Column::MenuId.eq(fx.user_menu_id))
        .count(&fx.db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn role_actions_can_be_added_and_removed() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .add_role_actions(fx.role_id, fx.user_menu_id, &["view"])
        .await
        .unwrap();
    let row = permissions
        .add_role_actions(fx.role_id, fx.user_menu_id, &["edit", "export"])
        .await
        .unwrap();
    assert_eq!(row.actions, actions(&["edit", "export", "view"]));

    let row = permissions
        .remove_role_actions(fx.role_id, fx.user_menu_id, &["export", "delete"])
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(row.actions, actions(&["edit", "view"]));

    let missing = permissions
        .remove_role_actions(fx.role_id, fx.exam_menu_id, &["view"])
        .await
        .unwrap();
    assert!(missing.is_none());

    assert!(permissions.revoke_role_permission(fx.role_id, fx.user_menu_id).await.unwrap());
    assert!(
        permissions
            .resolve_actions(fx.user_id, fx.user_menu_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn admin_scenario_role_then_override() {
    let fx = fixture().await;
    assert_eq!(fx.role_id, 1);
    assert_eq!(fx.role_menu_id, 2);
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .set_role_permission(1, 2, actions(&["new", "view", "edit", "delete"]))
        .await
        .unwrap();
    assert_eq!(
        permissions.resolve_actions(fx.user_id, 2).await.unwrap(),
        actions(&["new", "view", "edit", "delete"])
    );

    permissions
        .grant_user_permission(fx.user_id, 2, actions(&["view"]))
        .await
        .unwrap();
    assert_eq!(
        permissions.resolve_actions(fx.user_id, 2).await.unwrap(),
        actions(&["view"])
    );
}

#[tokio::test]
async fn missing_entities_are_not_found() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    let err = permissions.resolve_actions(999, fx.user_menu_id).await.unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::User, .. }));

    let err = permissions.resolve_actions(fx.user_id, 999).await.unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::Menu, .. }));

    let err = permissions
        .grant_user_permission(999, fx.user_menu_id, actions(&["view"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::User, .. }));

    let err = permissions
        .set_role_permission(fx.role_id, 999, actions(&["view"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::Menu, .. }));

    let err = permissions
        .remove_role_actions(999, 999, &["view"])
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::Role, .. }));

    let err = permissions
        .remove_role_actions(fx.role_id, 999, &["view"])
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::Menu, .. }));

    let err = permissions
        .revoke_role_permission(999, fx.role_menu_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::Role, .. }));

    let err = permissions
        .revoke_user_permission(999, fx.role_menu_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::User, .. }));

    let err = permissions
        .revoke_user_permission(fx.user_id, 999)
        .await
        .unwrap_err();
    assert!(matches!(err, AccessError::NotFound { entity: EntityKind::Menu, .. }));
}

#[tokio::test]
async fn inactive_user_menu_or_module_is_reported() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    MenuService::new(fx.db.clone()).deactivate(fx.user_menu_id).await.unwrap();
    let err = permissions.resolve_actions(fx.user_id, fx.user_menu_id).await.unwrap_err();
    assert!(matches!(err, AccessError::Inactive { entity: EntityKind::Menu, .. }));

    ModuleService::new(fx.db.clone()).deactivate(fx.exam_module_id).await.unwrap();
    let err = permissions.resolve_actions(fx.user_id, fx.exam_menu_id).await.unwrap_err();
    assert!(matches!(err, AccessError::Inactive { entity: EntityKind::Menu, .. }));

    UserService::new(fx.db.clone()).deactivate(fx.user_id).await.unwrap();
    let err = permissions.resolve_actions(fx.user_id, fx.role_menu_id).await.unwrap_err();
    assert!(matches!(err, AccessError::Inactive { entity: EntityKind::User, .. }));
}

#[tokio::test]
async fn inactive_role_grants_nothing_but_overrides_still_apply() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .set_role_permission(fx.role_id, fx.role_menu_id, full_access())
        .await
        .unwrap();
    permissions
        .grant_user_permission(fx.user_id, fx.user_menu_id, actions(&["view"]))
        .await
        .unwrap();
    RoleService::new(fx.db.clone()).deactivate(fx.role_id).await.unwrap();

    assert!(
        permissions
            .resolve_actions(fx.user_id, fx.role_menu_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(
        permissions.resolve_actions(fx.user_id, fx.user_menu_id).await.unwrap(),
        actions(&["view"])
    );
}

#[tokio::test]
async fn user_without_role_only_has_overrides() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());
    let loner = UserService::new(fx.db.clone())
        .create(new_user("applicant.reviewer", None))
        .await
        .unwrap();

    permissions
        .set_role_permission(fx.role_id, fx.role_menu_id, full_access())
        .await
        .unwrap();
    assert!(
        permissions
            .resolve_actions(loner.id, fx.role_menu_id)
            .await
            .unwrap()
            .is_empty()
    );

    permissions
        .grant_user_permission(loner.id, fx.role_menu_id, actions(&["view"]))
        .await
        .unwrap();
    assert!(permissions.has_action(loner.id, fx.role_menu_id, "view").await.unwrap());
    assert!(!permissions.has_action(loner.id, fx.role_menu_id, "edit").await.unwrap());
}

#[tokio::test]
async fn resolve_all_matches_single_lookups() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    permissions
        .set_role_permission(fx.role_id, fx.user_menu_id, actions(&["view", "edit"]))
        .await
        .unwrap();
    permissions
        .set_role_permission(fx.role_id, fx.role_menu_id, full_access())
        .await
        .unwrap();
    permissions
        .grant_user_permission(fx.user_id, fx.role_menu_id, actions(&["view"]))
        .await
        .unwrap();
    MenuService::new(fx.db.clone()).deactivate(fx.exam_menu_id).await.unwrap();

    let all = permissions.resolve_all(fx.user_id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(!all.contains_key(&fx.exam_menu_id));
    for (menu_id, resolved) in &all {
        let single = permissions.resolve_actions(fx.user_id, *menu_id).await.unwrap();
        assert_eq!(&single, resolved);
    }
    assert_eq!(all[&fx.role_menu_id], actions(&["view"]));
}

#[tokio::test]
async fn resetting_role_permission_updates_the_single_row() {
    let fx = fixture().await;
    let permissions = PermissionService::new(fx.db.clone());

    let first = permissions
        .set_role_permission(fx.role_id, fx.user_menu_id, full_access())
        .await
        .unwrap();
    let second = permissions
        .set_role_permission(fx.role_id, fx.user_menu_id, actions(&["view"]))
        .await
        .unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.actions, actions(&["view"]));

    let rows = Permission::find()
        .filter(permission::Column::RoleId.eq(fx.role_id))
        .filter(permission::Column::MenuId.eq(fx.user_menu_id))
        .count(&fx.db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(
        permissions.resolve_actions(fx.user_id, fx.user_menu_id).await.unwrap(),
        actions(&["view"])
    );
}
