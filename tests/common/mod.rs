#![allow(dead_code)]

use hrgate::auth::{Action, ActionSet};
use hrgate::entities::{menu::MenuType, prelude::*, permission, user_permission};
use hrgate::services::{
    MenuService, ModuleService, NewMenu, NewModule, NewUser, RoleService, UserService,
};
use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

/// Fresh in-memory SQLite database with the schema derived from the entities.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();

    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let tables = [
        schema.create_table_from_entity(Role),
        schema.create_table_from_entity(Department),
        schema.create_table_from_entity(Module),
        schema.create_table_from_entity(Menu),
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Permission),
        schema.create_table_from_entity(UserPermission),
    ];
    for table in tables {
        db.execute(backend.build(&table)).await.unwrap();
    }

    let indexes = [
        Index::create()
            .name("idx-permission-role-menu")
            .table(Permission)
            .col(permission::Column::RoleId)
            .col(permission::Column::MenuId)
            .unique()
            .to_owned(),
        Index::create()
            .name("idx-user-permission-user-menu")
            .table(UserPermission)
            .col(user_permission::Column::UserId)
            .col(user_permission::Column::MenuId)
            .unique()
            .to_owned(),
    ];
    for index in indexes {
        db.execute(backend.build(&index)).await.unwrap();
    }

    db
}

pub fn actions(tokens: &[&str]) -> ActionSet {
    tokens.iter().copied().collect()
}

pub fn full_access() -> ActionSet {
    ActionSet::from(&[Action::New, Action::View, Action::Edit, Action::Delete][..])
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub role_id: i32,
    pub admin_module_id: i32,
    pub exam_module_id: i32,
    pub user_menu_id: i32,
    pub role_menu_id: i32,
    pub exam_menu_id: i32,
    pub user_id: i32,
}

pub fn new_user(username: &str, role_id: Option<i32>) -> NewUser {
    NewUser {
        username: username.to_string(),
        mail: format!("{username}@example.com"),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        role_id,
        department_id: None,
    }
}

pub fn new_menu(module_id: i32, code: &str, parent: Option<&str>, order_by: i32) -> NewMenu {
    NewMenu {
        module_id,
        parent_code: parent.map(str::to_string),
        code: code.to_string(),
        name: code.to_lowercase().replace('_', " "),
        menu_type: MenuType::Master,
        order_by,
    }
}

/// `system_admin` (id 1) with modules ADMIN, SYSTEM and EXAM, menus
/// USER_MASTER (id 1), ROLE_MASTER (id 2), EXAM_SCHEDULE (id 3), and one user
/// holding the role. No permissions are granted.
pub async fn fixture() -> Fixture {
    let db = setup_db().await;

    let role = RoleService::new(db.clone())
        .create("system_admin", "System Administrator")
        .await
        .unwrap();

    let modules = ModuleService::new(db.clone());
    let mut module_ids = Vec::new();
    for (order_by, code) in ["ADMIN", "SYSTEM", "EXAM"].into_iter().enumerate() {
        let created = modules
            .create(NewModule {
                code: code.to_string(),
                name: code.to_string(),
                path: format!("/{}", code.to_lowercase()),
                order_by: order_by as i32 + 1,
            })
            .await
            .unwrap();
        module_ids.push(created.id);
    }

    let menus = MenuService::new(db.clone());
    let user_menu = menus
        .create(new_menu(module_ids[0], "USER_MASTER", None, 1))
        .await
        .unwrap();
    let role_menu = menus
        .create(new_menu(module_ids[0], "ROLE_MASTER", None, 2))
        .await
        .unwrap();
    let exam_menu = menus
        .create(new_menu(module_ids[2], "EXAM_SCHEDULE", None, 1))
        .await
        .unwrap();

    let user = UserService::new(db.clone())
        .create(new_user("hr.officer", Some(role.id)))
        .await
        .unwrap();

    Fixture {
        db,
        role_id: role.id,
        admin_module_id: module_ids[0],
        exam_module_id: module_ids[2],
        user_menu_id: user_menu.id,
        role_menu_id: role_menu.id,
        exam_menu_id: exam_menu.id,
        user_id: user.id,
    }
}
