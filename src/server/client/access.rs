use crate::server::response::{ApiError, StoreResultExt};
use crate::store::Store;
use crate::types::{Project, User};

/// Returns the project when `user` is its client. Other users' projects are
/// reported as missing rather than forbidden.
pub fn owned_project(
    store: &dyn Store,
    user: &User,
    project_id: &str,
) -> Result<Project, ApiError> {
    let project = store
        .get_project(project_id)
        .api_err("Failed to get project")?;

    match project {
        Some(project) if project.client_id == user.id() => Ok(project),
        _ => Err(ApiError::not_found("Project not found")),
    }
}
