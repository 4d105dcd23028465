use async_trait::async_trait;
use stash_media::{
    ClusterId, GroupId, GroupNode, GroupRow, GroupStore, GroupTreeResolver, MediaResult,
    MemoryGroupStore,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn ids(nodes: &[GroupNode]) -> Vec<GroupId> {
    nodes.iter().map(|n| n.id).collect()
}

fn row(id: GroupId, cluster: ClusterId, name: &str, parent: Option<GroupId>) -> GroupRow {
    GroupRow {
        id,
        cluster,
        name: name.to_string(),
        icon: "folder".to_string(),
        collapsed: false,
        parent,
    }
}

#[tokio::test]
async fn test_empty_cluster_has_only_virtual_groups() -> MediaResult<()> {
    let resolver = GroupTreeResolver::new(Arc::new(MemoryGroupStore::new()));
    let tree = resolver.resolve(1).await?;

    assert_eq!(ids(&tree), vec![-1, -2, -3]);
    let names: Vec<_> = tree.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Unsorted", "Trash", "Everything"]);
    assert!(tree.iter().all(|n| n.children.is_empty()));
    Ok(())
}

#[tokio::test]
async fn test_nested_child_is_materialized() -> MediaResult<()> {
    let store = MemoryGroupStore::from_rows([
        row(5, 1, "Photos", None),
        row(9, 1, "2024", Some(5)),
        row(11, 2, "Other cluster", None),
    ]);
    let resolver = GroupTreeResolver::new(Arc::new(store));
    let tree = resolver.resolve(1).await?;

    assert_eq!(ids(&tree), vec![-1, -2, -3, 5]);
    let photos = &tree[3];
    assert_eq!(photos.name, "Photos");
    assert_eq!(photos.icon, "folder");
    assert_eq!(ids(&photos.children), vec![9]);
    assert!(photos.children[0].children.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_writes_are_visible_on_next_resolve() -> MediaResult<()> {
    let store = Arc::new(MemoryGroupStore::new());
    let resolver = GroupTreeResolver::new(store.clone());

    let trips = store.create_group(3, "Trips", None).await?;
    let before = resolver.resolve(3).await?;
    assert_eq!(ids(&before[3..]), vec![trips]);

    let alps = store.create_group(3, "Alps", Some(trips)).await?;
    let beach = store.create_group(3, "Beach", Some(trips)).await?;
    store.set_collapsed(3, trips, true).await?;
    let after = resolver.resolve(3).await?;
    assert!(after[3].collapsed);
    assert_eq!(ids(&after[3].children), vec![alps, beach]);
    Ok(())
}

/// A store that only answers per-parent queries, counting them.
struct ParentQueryStore {
    inner: MemoryGroupStore,
    queries: AtomicUsize,
}

#[async_trait]
impl GroupStore for ParentQueryStore {
    async fn groups_by_parent(
        &self,
        cluster: ClusterId,
        parent: Option<GroupId>,
    ) -> MediaResult<Vec<GroupRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.groups_by_parent(cluster, parent).await
    }
}

#[tokio::test]
async fn test_default_cluster_walk_uses_parent_queries() -> MediaResult<()> {
    let store = Arc::new(ParentQueryStore {
        inner: MemoryGroupStore::from_rows([
            row(1, 1, "B", None),
            row(2, 1, "A", None),
            row(3, 1, "Child", Some(1)),
        ]),
        queries: AtomicUsize::new(0),
    });
    let resolver = GroupTreeResolver::new(store.clone());
    let tree = resolver.resolve(1).await?;

    assert_eq!(ids(&tree[3..]), vec![2, 1]);
    assert_eq!(ids(&tree[4].children), vec![3]);
    // roots, then one query per group
    assert_eq!(store.queries.load(Ordering::SeqCst), 4);
    Ok(())
}
