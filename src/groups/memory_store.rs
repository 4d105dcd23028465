use super::{GroupRow, GroupStore};
use crate::error::{MediaError, MediaResult};
use crate::{ClusterId, GroupId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::RwLock;

/// Group rows held in memory, with the write-side checks that keep them a forest.
#[derive(Debug, Default)]
pub struct MemoryGroupStore {
    rows: RwLock<BTreeMap<GroupId, GroupRow>>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes rows as they are. Consistency of the parent links is the caller's concern.
    pub fn from_rows(rows: impl IntoIterator<Item = GroupRow>) -> Self {
        Self {
            rows: RwLock::new(rows.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    /// Loads a JSON array of rows.
    pub fn from_json_file(path: &Path) -> MediaResult<Self> {
        let raw = std::fs::read(path)?;
        let rows: Vec<GroupRow> = serde_json::from_slice(&raw)?;
        Ok(Self::from_rows(rows))
    }

    /// Creates a group. A negative or absent parent makes it a root.
    pub async fn create_group(
        &self,
        cluster: ClusterId,
        name: impl Into<String>,
        parent: Option<GroupId>,
    ) -> MediaResult<GroupId> {
        let parent = parent.filter(|p| *p >= 0);
        let mut rows = self.rows.write().await;
        if let Some(p) = parent {
            require_in_cluster(&rows, cluster, p)?;
        }
        let id = rows.keys().next_back().map_or(1, |last| (*last).max(0) + 1);
        rows.insert(
            id,
            GroupRow {
                id,
                cluster,
                name: name.into(),
                icon: String::new(),
                collapsed: false,
                parent,
            },
        );
        Ok(id)
    }

    pub async fn set_collapsed(
        &self,
        cluster: ClusterId,
        id: GroupId,
        collapsed: bool,
    ) -> MediaResult<()> {
        let mut rows = self.rows.write().await;
        require_in_cluster(&rows, cluster, id)?;
        if let Some(row) = rows.get_mut(&id) {
            row.collapsed = collapsed;
        }
        Ok(())
    }

    /// Moves a group. A negative or absent parent makes it a root.
    ///
    /// Rejects a parent that is the group itself or one of its descendants.
    pub async fn set_parent(
        &self,
        cluster: ClusterId,
        id: GroupId,
        parent: Option<GroupId>,
    ) -> MediaResult<()> {
        let parent = parent.filter(|p| *p >= 0);
        let mut rows = self.rows.write().await;
        require_in_cluster(&rows, cluster, id)?;
        if let Some(p) = parent {
            require_in_cluster(&rows, cluster, p)?;
            // Walk up from the new parent; meeting `id` means `p` is inside its subtree.
            let mut cursor = Some(p);
            let mut steps = 0;
            while let Some(current) = cursor {
                if current == id || steps > rows.len() {
                    return Err(MediaError::GroupCycle { group: id, parent: p });
                }
                cursor = rows.get(&current).and_then(|r| r.parent);
                steps += 1;
            }
        }
        if let Some(row) = rows.get_mut(&id) {
            row.parent = parent;
        }
        Ok(())
    }
}

fn require_in_cluster(
    rows: &BTreeMap<GroupId, GroupRow>,
    cluster: ClusterId,
    id: GroupId,
) -> MediaResult<()> {
    match rows.get(&id) {
        Some(row) if row.cluster == cluster => Ok(()),
        _ => Err(MediaError::UnknownGroup(id)),
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn groups_by_parent(
        &self,
        cluster: ClusterId,
        parent: Option<GroupId>,
    ) -> MediaResult<Vec<GroupRow>> {
        let rows = self.rows.read().await;
        let mut matching: Vec<GroupRow> = rows
            .values()
            .filter(|r| r.cluster == cluster && r.parent == parent)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }

    async fn groups_in_cluster(&self, cluster: ClusterId) -> MediaResult<Vec<GroupRow>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|r| r.cluster == cluster)
            .cloned()
            .collect())
    }
}
