//! Startup jobs run once before the HTTP server accepts traffic.
//!
//! Call `run_startup` after migrations have been applied.

use crate::config::AdminConfig;
use crate::services::UserService;

/// Run every startup job.
///
/// Notes
/// - Failures are logged and do not abort startup; the API still serves without an
///   administrator account.
pub async fn run_startup(user_service: &UserService, admin: Option<&AdminConfig>) {
    bootstrap_admin(user_service, admin).await;
}

/// Ensure the configured administrator exists and carries the ADMIN role.
pub async fn bootstrap_admin(user_service: &UserService, admin: Option<&AdminConfig>) {
    let Some(admin) = admin else {
        log::info!("No [admin] section configured, skipping administrator bootstrap");
        return;
    };

    match user_service.ensure_admin(admin).await {
        Ok(user) => log::info!("Administrator account ready: {}", user.email),
        Err(e) => log::error!("Failed to bootstrap administrator {}: {e:?}", admin.email),
    }
}
