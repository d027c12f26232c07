use crate::error::{Error, Result};
use crate::types::Deliverable;

pub const DEFAULT_FILE_TYPE: &str = "document";

/// Fields checked before anything is written to storage or the database.
#[derive(Debug, Clone, Copy)]
pub struct DeliverableDraft<'a> {
    pub project_id: &'a str,
    pub title: &'a str,
    pub has_file: bool,
    pub external_link: Option<&'a str>,
}

pub fn validate_draft(draft: &DeliverableDraft<'_>) -> Result<()> {
    if draft.project_id.trim().is_empty() {
        return Err(Error::BadRequest("Please select a project".to_string()));
    }
    if draft.title.trim().is_empty() {
        return Err(Error::BadRequest("Title is required".to_string()));
    }
    let has_link = draft.external_link.is_some_and(|l| !l.trim().is_empty());
    if !draft.has_file && !has_link {
        return Err(Error::BadRequest(
            "Either a file or an external link is required".to_string(),
        ));
    }
    Ok(())
}

/// Version after an edit: replacing the file or the link counts as a new revision.
#[must_use]
pub fn next_version(
    current: &Deliverable,
    file_url: Option<&str>,
    external_link: Option<&str>,
) -> i64 {
    let file_changed = file_url.is_some_and(|u| current.file_url.as_deref() != Some(u));
    let link_changed = external_link.is_some_and(|l| current.external_link.as_deref() != Some(l));

    if file_changed || link_changed {
        current.version + 1
    } else {
        current.version
    }
}
