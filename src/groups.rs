//! Per-cluster group hierarchy, resolved from flat parent/child rows into a tree.

mod memory_store;

pub use memory_store::MemoryGroupStore;

use crate::error::MediaResult;
use crate::{ClusterId, GroupId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// A group as stored, pointing at its parent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRow {
    pub id: GroupId,
    pub cluster: ClusterId,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub parent: Option<GroupId>,
}

/// A group with its children materialized, as served to clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupNode {
    pub id: GroupId,
    pub name: String,
    pub icon: String,
    pub collapsed: bool,
    pub children: Vec<GroupNode>,
}

/// Synthetic groups shown in every cluster. They are never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VirtualGroup {
    /// Assets without a group.
    Unsorted,
    Trash,
    /// Every asset in the cluster.
    Everything,
}

impl VirtualGroup {
    /// Output order of the virtual groups, ahead of the real roots.
    pub const ALL: [VirtualGroup; 3] = [
        VirtualGroup::Unsorted,
        VirtualGroup::Trash,
        VirtualGroup::Everything,
    ];

    pub fn id(self) -> GroupId {
        match self {
            VirtualGroup::Unsorted => -1,
            VirtualGroup::Trash => -2,
            VirtualGroup::Everything => -3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VirtualGroup::Unsorted => "Unsorted",
            VirtualGroup::Trash => "Trash",
            VirtualGroup::Everything => "Everything",
        }
    }

    pub fn from_id(id: GroupId) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.id() == id)
    }

    pub fn node(self) -> GroupNode {
        GroupNode {
            id: self.id(),
            name: self.name().to_string(),
            icon: String::new(),
            collapsed: false,
            children: Vec::new(),
        }
    }
}

/// Read access to stored groups.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Direct children of `parent` (roots when `None`) in `cluster`, ordered by name.
    async fn groups_by_parent(
        &self,
        cluster: ClusterId,
        parent: Option<GroupId>,
    ) -> MediaResult<Vec<GroupRow>>;

    /// Every group reachable from the roots of `cluster`.
    ///
    /// The default walks `groups_by_parent` breadth-first; stores that can load a
    /// cluster in one read should override it.
    async fn groups_in_cluster(&self, cluster: ClusterId) -> MediaResult<Vec<GroupRow>> {
        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = VecDeque::from([None]);
        while let Some(parent) = pending.pop_front() {
            for row in self.groups_by_parent(cluster, parent).await? {
                if seen.insert(row.id) {
                    pending.push_back(Some(row.id));
                    rows.push(row);
                }
            }
        }
        Ok(rows)
    }
}

/// Turns flat rows into a forest of roots, children sorted by name.
///
/// Rows whose parent is not among `rows` are unreachable and dropped. Each row is
/// visited at most once, so malformed parent links cannot cause a loop.
pub fn build_forest(rows: Vec<GroupRow>) -> Vec<GroupNode> {
    let mut children: HashMap<Option<GroupId>, Vec<GroupRow>> = HashMap::new();
    for row in rows {
        children.entry(row.parent).or_default().push(row);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    }
    materialize_children(None, &mut children)
}

fn materialize_children(
    parent: Option<GroupId>,
    children: &mut HashMap<Option<GroupId>, Vec<GroupRow>>,
) -> Vec<GroupNode> {
    let Some(rows) = children.remove(&parent) else {
        return Vec::new();
    };
    rows.into_iter()
        .map(|row| GroupNode {
            children: materialize_children(Some(row.id), children),
            id: row.id,
            name: row.name,
            icon: row.icon,
            collapsed: row.collapsed,
        })
        .collect()
}

/// Builds the group tree served for a cluster. Always reads current rows.
pub struct GroupTreeResolver<S> {
    store: Arc<S>,
}

impl<S: GroupStore> GroupTreeResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Virtual groups (Unsorted, Trash, Everything) followed by the real roots.
    pub async fn resolve(&self, cluster: ClusterId) -> MediaResult<Vec<GroupNode>> {
        let rows = self.store.groups_in_cluster(cluster).await?;
        debug!(cluster, rows = rows.len(), "resolving group tree");

        let mut tree: Vec<GroupNode> = VirtualGroup::ALL.iter().map(|g| g.node()).collect();
        tree.extend(build_forest(rows));
        Ok(tree)
    }
}
