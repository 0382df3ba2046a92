//! Workspace group resolution and creator identity.

use tracing::{debug, info};

use margo_core::{AnnotationStore, Group, Profile, Result};

/// Find the named annotation group, creating it when absent.
pub async fn resolve_group(store: &dyn AnnotationStore, name: &str) -> Result<Group> {
    let groups = store.list_groups().await?;
    if let Some(group) = groups.into_iter().find(|g| g.name == name) {
        debug!(group_id = %group.id, name, "Using existing annotation group");
        return Ok(group);
    }
    let group = store.create_group(name).await?;
    info!(group_id = %group.id, name, "Created annotation group");
    Ok(group)
}

/// Derive the creator URI recorded on annotations this user writes.
///
/// ORCID wins when the profile carries one, then an explicit profile link,
/// then the authority's user page.
pub fn creator_uri(profile: &Profile) -> String {
    if let Some(metadata) = &profile.metadata {
        if let Some(orcid) = &metadata.orcid {
            return format!("https://orcid.org/{orcid}");
        }
        if let Some(link) = &metadata.link {
            return link.clone();
        }
    }
    let authority = profile.authority().unwrap_or("hypothes.is");
    format!("https://{authority}/users/{}", profile.username())
}
