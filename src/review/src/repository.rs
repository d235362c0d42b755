// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Post storage port and the in-memory adapter.

use std::collections::HashMap;
use uuid::Uuid;

use crate::{Bucket, ReviewError, StoredPost};

/// Persistence contract for submitted posts.
///
/// The review desk is the only caller; the classifier never reads or writes
/// the store.
pub trait PostRepository {
    fn insert(&mut self, post: StoredPost) -> Result<(), ReviewError>;

    fn get(&self, id: Uuid) -> Result<Option<StoredPost>, ReviewError>;

    /// Replace a stored post. Fails with `NotFound` if it was never inserted.
    fn update(&mut self, post: StoredPost) -> Result<(), ReviewError>;

    /// Posts in `bucket`, in submission order
    fn list(&self, bucket: Bucket) -> Result<Vec<StoredPost>, ReviewError>;

    fn all(&self) -> Result<Vec<StoredPost>, ReviewError>;
}

/// Process-memory store. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    posts: HashMap<Uuid, StoredPost>,
    order: Vec<Uuid>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot every post as a JSON array, in submission order.
    pub fn export_json(&self) -> Result<String, ReviewError> {
        Ok(serde_json::to_string_pretty(&self.all()?)?)
    }

    pub fn import_json(json: &str) -> Result<Self, ReviewError> {
        let posts: Vec<StoredPost> = serde_json::from_str(json)?;
        let mut repo = Self::new();
        for post in posts {
            repo.insert(post)?;
        }
        Ok(repo)
    }
}

impl PostRepository for InMemoryRepository {
    fn insert(&mut self, post: StoredPost) -> Result<(), ReviewError> {
        if self.posts.contains_key(&post.id) {
            return Err(ReviewError::Storage(format!(
                "post {} is already stored",
                post.id
            )));
        }
        self.order.push(post.id);
        self.posts.insert(post.id, post);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<StoredPost>, ReviewError> {
        Ok(self.posts.get(&id).cloned())
    }

    fn update(&mut self, post: StoredPost) -> Result<(), ReviewError> {
        match self.posts.get_mut(&post.id) {
            Some(slot) => {
                *slot = post;
                Ok(())
            }
            None => Err(ReviewError::NotFound(post.id)),
        }
    }

    fn list(&self, bucket: Bucket) -> Result<Vec<StoredPost>, ReviewError> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.posts.get(id))
            .filter(|p| p.bucket == bucket)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<StoredPost>, ReviewError> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.posts.get(id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_classifier::Post;

    fn stored(content: &str) -> StoredPost {
        StoredPost::new(Post::new(content, "Selling", "u1"))
    }

    #[test]
    fn test_insert_and_get() {
        let mut repo = InMemoryRepository::new();
        let post = stored("hello");
        let id = post.id;
        repo.insert(post).unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(id).unwrap().unwrap().post.content, "hello");
        assert!(repo.get(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut repo = InMemoryRepository::new();
        let post = stored("hello");
        repo.insert(post.clone()).unwrap();
        assert!(matches!(repo.insert(post), Err(ReviewError::Storage(_))));
    }

    #[test]
    fn test_update_requires_existing_post() {
        let mut repo = InMemoryRepository::new();
        let post = stored("hello");
        assert!(matches!(
            repo.update(post.clone()),
            Err(ReviewError::NotFound(id)) if id == post.id
        ));
    }

    #[test]
    fn test_list_filters_by_bucket_in_submission_order() {
        let mut repo = InMemoryRepository::new();
        let mut first = stored("first");
        first.bucket = Bucket::Flagged;
        let second = stored("second");
        let mut third = stored("third");
        third.bucket = Bucket::Flagged;
        for post in [first, second, third] {
            repo.insert(post).unwrap();
        }

        let flagged: Vec<String> = repo
            .list(Bucket::Flagged)
            .unwrap()
            .into_iter()
            .map(|p| p.post.content)
            .collect();
        assert_eq!(flagged, vec!["first", "third"]);
        assert_eq!(repo.list(Bucket::Pending).unwrap().len(), 1);
    }

    #[test]
    fn test_export_and_import_snapshot() {
        let mut repo = InMemoryRepository::new();
        repo.insert(stored("one")).unwrap();
        repo.insert(stored("two")).unwrap();

        let json = repo.export_json().unwrap();
        let restored = InMemoryRepository::import_json(&json).unwrap();
        let contents: Vec<String> = restored
            .all()
            .unwrap()
            .into_iter()
            .map(|p| p.post.content)
            .collect();
        assert_eq!(contents, vec!["one", "two"]);
    }
}
