use tracing::debug;

use crate::auth::{Decision, DenyReason, PermissionService};
use crate::error::{AccessError, AccessResult, EntityKind};

/// Authorization boundary consulted by request handlers before they act.
///
/// Decisions are read-only and may be requested any number of times per request.
#[derive(Clone)]
pub struct AccessGuard {
    permission_service: PermissionService,
}

impl AccessGuard {
    pub fn new(permission_service: PermissionService) -> Self {
        Self { permission_service }
    }

    /// Decide whether `user_id` may perform `action` on the menu with row id `menu_id`.
    ///
    /// An unknown menu is an error rather than a deny.
    pub async fn authorize(
        &self,
        user_id: Option<i32>,
        menu_id: i32,
        action: &str,
    ) -> AccessResult<Decision> {
        let Some(user_id) = user_id else {
            debug!(menu_id, action, "denied: no user identity");
            return Ok(Decision::Deny(DenyReason::Unauthenticated));
        };

        let decision = match self.permission_service.resolve_actions(user_id, menu_id).await {
            Ok(actions) if actions.contains(action) => Decision::Allow,
            Ok(_) => Decision::Deny(DenyReason::Forbidden),
            Err(AccessError::NotFound {
                entity: EntityKind::User,
                ..
            }) => Decision::Deny(DenyReason::Unauthenticated),
            Err(AccessError::Inactive { .. }) => Decision::Deny(DenyReason::Inactive),
            Err(err) => return Err(err),
        };

        debug!(user_id, menu_id, action, ?decision, "authorization decided");
        Ok(decision)
    }

    /// Same as [`authorize`](Self::authorize) but addresses the menu by its code.
    pub async fn authorize_by_code(
        &self,
        user_id: Option<i32>,
        menu_code: &str,
        action: &str,
    ) -> AccessResult<Decision> {
        if user_id.is_none() {
            debug!(menu_code, action, "denied: no user identity");
            return Ok(Decision::Deny(DenyReason::Unauthenticated));
        }
        let target_menu = self.permission_service.menu_by_code(menu_code).await?;
        self.authorize(user_id, target_menu.id, action).await
    }

    /// Turns a deny into `AccessError::Denied` so handlers can use `?`.
    pub async fn require(&self, user_id: Option<i32>, menu_id: i32, action: &str) -> AccessResult<()> {
        match self.authorize(user_id, menu_id, action).await? {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AccessError::Denied(reason)),
        }
    }
}
