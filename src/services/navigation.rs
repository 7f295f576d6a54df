use std::collections::BTreeMap;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;

use crate::auth::{Action, ActionSet, PermissionService};
use crate::entities::menu::MenuType;
use crate::error::AccessResult;
use crate::services::hierarchy::{build_forest, HierarchyItem, TreeNode};
use crate::services::{MenuService, ModuleService};

/// One menu as the UI sees it, with the user's effective actions attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuEntry {
    pub id: i32,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
    pub name: String,
    pub menu_type: MenuType,
    pub actions: ActionSet,
}

impl HierarchyItem for MenuEntry {
    fn code(&self) -> &str {
        &self.code
    }

    fn parent_code(&self) -> Option<&str> {
        self.parent_code.as_deref().filter(|code| !code.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleNode {
    pub code: String,
    pub name: String,
    pub path: String,
    pub menus: Vec<TreeNode<MenuEntry>>,
}

#[derive(Clone)]
pub struct NavigationService {
    permission_service: PermissionService,
    module_service: ModuleService,
    menu_service: MenuService,
}

impl NavigationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            permission_service: PermissionService::new(db.clone()),
            module_service: ModuleService::new(db.clone()),
            menu_service: MenuService::new(db),
        }
    }

    /// Active modules with the menus the user may view, nested by parent code.
    ///
    /// A menu without `view` is still listed when one of its descendants is
    /// visible, so the path to that descendant stays navigable.
    pub async fn menu_tree(&self, user_id: i32) -> AccessResult<Vec<ModuleNode>> {
        let mut resolved = self.permission_service.resolve_all(user_id).await?;

        let modules = self.module_service.list_active().await?;
        let menus = self.menu_service.list_active().await?;

        let mut by_module: BTreeMap<i32, Vec<MenuEntry>> = BTreeMap::new();
        for m in menus {
            let actions = resolved.remove(&m.id).unwrap_or_default();
            by_module.entry(m.module_id).or_default().push(MenuEntry {
                id: m.id,
                code: m.menu_id,
                parent_code: m.parent_code,
                name: m.name,
                menu_type: m.menu_type,
                actions,
            });
        }

        let mut tree = Vec::new();
        for parent_module in modules {
            let entries = by_module.remove(&parent_module.id).unwrap_or_default();
            let forest = build_forest(entries, |entry| entry.actions.allows(Action::View));

            if !forest.detached.is_empty() {
                let codes: Vec<&str> = forest.detached.iter().map(|e| e.code.as_str()).collect();
                warn!(module = %parent_module.module_id, ?codes, "menus detached from navigation");
            }
            if forest.roots.is_empty() {
                continue;
            }

            tree.push(ModuleNode {
                code: parent_module.module_id,
                name: parent_module.name,
                path: parent_module.path,
                menus: forest.roots,
            });
        }

        Ok(tree)
    }
}
