use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Role-level grants: one action set per (role, menu)
        manager
            .create_table(
                Table::create()
                    .table(Permission::Table)
                    .if_not_exists()
                    .col(pk_auto(Permission::Id))
                    .col(integer(Permission::RoleId))
                    .col(integer(Permission::MenuId))
                    .col(json(Permission::Actions)) // e.g. ["new","view","edit","delete"]
                    .col(timestamp_with_time_zone(Permission::CreatedAt))
                    .col(timestamp_with_time_zone(Permission::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-permission-role")
                            .from(Permission::Table, Permission::RoleId)
                            .to(Role::Table, Role::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-permission-menu")
                            .from(Permission::Table, Permission::MenuId)
                            .to(Menu::Table, Menu::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx-permission-role-menu")
                            .col(Permission::RoleId)
                            .col(Permission::MenuId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        // Per-user overrides: a row replaces the role's set for that menu
        manager
            .create_table(
                Table::create()
                    .table(UserPermission::Table)
                    .if_not_exists()
                    .col(pk_auto(UserPermission::Id))
                    .col(integer(UserPermission::UserId))
                    .col(integer(UserPermission::MenuId))
                    .col(json(UserPermission::Actions))
                    .col(timestamp_with_time_zone(UserPermission::CreatedAt))
                    .col(timestamp_with_time_zone(UserPermission::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user-permission-user")
                            .from(UserPermission::Table, UserPermission::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-user-permission-menu")
                            .from(UserPermission::Table, UserPermission::MenuId)
                            .to(Menu::Table, Menu::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx-user-permission-user-menu")
                            .col(UserPermission::UserId)
                            .col(UserPermission::MenuId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserPermission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Permission::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Permission {
    Table,
    Id,
    RoleId,
    MenuId,
    Actions,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserPermission {
    Table,
    Id,
    UserId,
    MenuId,
    Actions,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Role {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Menu {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
