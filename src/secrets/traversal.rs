//! Recursive discovery of documents under a path prefix.
//!
//! The backend lists one level at a time, so the walk recurses into every
//! sub-prefix and applies the name predicate to terminal entries only. A
//! non-matching intermediate prefix never hides a matching document below it.

use super::backends::DocumentClient;
use crate::secrets::error::{Result, StoreError};
use futures::future::{BoxFuture, FutureExt};
use tracing::trace;

/// Predicate applied to a terminal entry's own name.
pub type NamePredicate<'p> = dyn Fn(&str) -> bool + Send + Sync + 'p;

/// Default bound on sub-prefix nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Depth-first walker over one backend namespace.
///
/// Start prefixes and returned paths are relative to `root`; listing calls go
/// to `root + prefix`.
pub struct PathWalker<'a> {
    client: &'a dyn DocumentClient,
    root: &'a str,
    max_depth: usize,
}

impl<'a> PathWalker<'a> {
    pub fn new(client: &'a dyn DocumentClient, root: &'a str, max_depth: usize) -> Self {
        Self { client, root, max_depth }
    }

    /// Collect every terminal path under `start` whose name satisfies `predicate`.
    ///
    /// Order is depth-first, children in backend listing order. Any listing
    /// failure aborts the walk and no partial result is returned.
    pub async fn find_matching_paths(
        &self,
        start: &str,
        predicate: &NamePredicate<'_>,
    ) -> Result<Vec<String>> {
        self.walk(start.to_string(), predicate, 0).await
    }

    fn walk<'w>(
        &'w self,
        prefix: String,
        predicate: &'w NamePredicate<'w>,
        depth: usize,
    ) -> BoxFuture<'w, Result<Vec<String>>> {
        async move {
            if depth > self.max_depth {
                return Err(StoreError::traversal_too_deep(prefix, self.max_depth));
            }

            let listed = format!("{}{}", self.root, prefix.trim_start_matches('/'));
            let entries = self.client.list(&listed).await?;
            trace!(prefix = %listed, entries = entries.len(), depth, "Listed prefix");

            let mut collector = Vec::new();
            for entry in entries {
                let path = format!("{}{}", prefix, entry.name);
                if entry.is_prefix {
                    collector.extend(self.walk(path, predicate, depth + 1).await?);
                } else if predicate(&entry.name) {
                    collector.push(path);
                }
            }

            Ok(collector)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::backends::{InMemoryDocumentClient, PropertyMap};
    use crate::secrets::matcher::NameMatcher;

    async fn seeded(paths: &[&str]) -> InMemoryDocumentClient {
        let client = InMemoryDocumentClient::new();
        for path in paths {
            let mut props = PropertyMap::new();
            props.insert("k".to_string(), b"v".to_vec());
            client.insert(*path, props).await;
        }
        client
    }

    #[tokio::test]
    async fn test_finds_nested_documents_depth_first() {
        let client = seeded(&["sdb/a", "sdb/team/b", "sdb/team/deep/c", "sdb/z"]).await;
        let walker = PathWalker::new(&client, "sdb/", DEFAULT_MAX_DEPTH);

        let found = walker.find_matching_paths("/", &|_| true).await.unwrap();
        assert_eq!(found, vec!["/a", "/team/b", "/team/deep/c", "/z"]);
    }

    #[tokio::test]
    async fn test_predicate_only_sees_terminal_names() {
        let client = seeded(&["sdb/other/db-main", "sdb/db-dir/cache", "sdb/db-top"]).await;
        let walker = PathWalker::new(&client, "sdb/", DEFAULT_MAX_DEPTH);

        let found =
            walker.find_matching_paths("", &|name: &str| name.starts_with("db-")).await.unwrap();
        assert_eq!(found, vec!["db-top", "other/db-main"]);
    }

    #[tokio::test]
    async fn test_predicate_may_borrow_local_state() {
        let client = seeded(&["sdb/db-main", "sdb/team/db-replica", "sdb/cache"]).await;
        let walker = PathWalker::new(&client, "sdb/", DEFAULT_MAX_DEPTH);

        let matcher = NameMatcher::new("db-*").unwrap();
        let found =
            walker.find_matching_paths("", &|name: &str| matcher.matches(name)).await.unwrap();
        assert_eq!(found, vec!["db-main", "team/db-replica"]);
    }

    #[tokio::test]
    async fn test_empty_listing_yields_nothing() {
        let client = seeded(&[]).await;
        let walker = PathWalker::new(&client, "sdb/", DEFAULT_MAX_DEPTH);
        assert!(walker.find_matching_paths("/missing/", &|_| true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_depth_bound() {
        let client = seeded(&["sdb/a/b/c/doc"]).await;

        let shallow = PathWalker::new(&client, "sdb/", 2);
        let err = shallow.find_matching_paths("", &|_| true).await.unwrap_err();
        assert!(matches!(err, StoreError::TraversalTooDeep { max_depth: 2, .. }));

        let enough = PathWalker::new(&client, "sdb/", 3);
        assert_eq!(enough.find_matching_paths("", &|_| true).await.unwrap(), vec!["a/b/c/doc"]);
    }
}
