use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Role::Table)
                    .if_not_exists()
                    .col(pk_auto(Role::Id))
                    .col(string(Role::Name).unique_key())
                    .col(string(Role::DisplayName))
                    .col(boolean(Role::IsActive).default(true))
                    .col(timestamp_with_time_zone(Role::CreatedAt))
                    .col(timestamp_with_time_zone(Role::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Department::Table)
                    .if_not_exists()
                    .col(pk_auto(Department::Id))
                    .col(string(Department::Name).unique_key())
                    .col(boolean(Department::IsActive).default(true))
                    .col(timestamp_with_time_zone(Department::CreatedAt))
                    .col(timestamp_with_time_zone(Department::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Module::Table)
                    .if_not_exists()
                    .col(pk_auto(Module::Id))
                    .col(string(Module::ModuleId).unique_key()) // e.g. "ADMIN", "EXAM"
                    .col(string(Module::Name))
                    .col(string(Module::Path))
                    .col(integer(Module::OrderBy).default(0))
                    .col(boolean(Module::IsActive).default(true))
                    .col(timestamp_with_time_zone(Module::CreatedAt))
                    .col(timestamp_with_time_zone(Module::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Menu::Table)
                    .if_not_exists()
                    .col(pk_auto(Menu::Id))
                    .col(string_null(Menu::ParentCode))
                    .col(integer(Menu::ModuleId))
                    .col(string(Menu::Name))
                    .col(string_len(Menu::MenuType, 16)) // Master / Transaction / Report
                    .col(string(Menu::MenuId).unique_key())
                    .col(integer(Menu::OrderBy).default(0))
                    .col(boolean(Menu::IsActive).default(true))
                    .col(timestamp_with_time_zone(Menu::CreatedAt))
                    .col(timestamp_with_time_zone(Menu::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-menu-module")
                            .from(Menu::Table, Menu::ModuleId)
                            .to(Module::Table, Module::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-menu-module-order")
                    .table(Menu::Table)
                    .col(Menu::ModuleId)
                    .col(Menu::OrderBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Menu::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Module::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Department::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Role::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Role {
    Table,
    Id,
    Name,
    DisplayName,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
    Name,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Module {
    Table,
    Id,
    ModuleId,
    Name,
    Path,
    OrderBy,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Menu {
    Table,
    Id,
    ParentCode,
    ModuleId,
    Name,
    MenuType,
    MenuId,
    OrderBy,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
