// MediaGit - Git for Media Files
// Copyright (C) 2025 MediaGit Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Commit object representing snapshots in version control
//!
//! A Commit object captures a moment in time with metadata about changes,
//! references to the tree snapshot, and parent commits for history tracking.

use crate::{ObjectType, Oid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author or committer information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Name of the author or committer
    pub name: String,

    /// Email address
    pub email: String,

    /// Timestamp of the signature
    pub timestamp: DateTime<Utc>,
}

impl Signature {
    /// Create a new signature
    ///
    /// # Arguments
    ///
    /// * `name` - Author or committer name
    /// * `email` - Email address
    /// * `timestamp` - When the action occurred (defaults to now if not specified)
    ///
    /// # Examples
    ///
    /// ```
    /// use mediagit_versioning::Signature;
    /// use chrono::Utc;
    ///
    /// let sig = Signature::new(
    ///     "Alice Developer".to_string(),
    ///     "alice@example.com".to_string(),
    ///     Utc::now()
    /// );
    /// assert_eq!(sig.name, "Alice Developer");
    /// ```
    pub fn new(name: String, email: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            name,
            email,
            timestamp,
        }
    }

    /// Create a signature with current timestamp
    pub fn now(name: String, email: String) -> Self {
        Self {
            name,
            email,
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {}",
            self.name,
            self.email,
            self.timestamp.timestamp()
        )
    }
}

/// Commit object representing a snapshot in version control history
///
/// A commit captures:
/// - A snapshot of the repository (tree OID)
/// - Parent commits (for history)
/// - Metadata about the change (author, committer, message, timestamp)
///
/// # Examples
///
/// ```no_run
/// use mediagit_versioning::{Commit, Signature, Oid, ObjectDatabase, ObjectType, Tree};
/// use mediagit_storage::LocalBackend;
/// use chrono::Utc;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let storage = Arc::new(LocalBackend::new("/tmp/odb")?);
///     let odb = ObjectDatabase::new(storage, 100);
///
///     // Create a tree and write it
///     let tree = Tree::new();
///     let tree_oid = tree.write(&odb).await?;
///
///     // Create a commit
///     let author = Signature::now(
///         "Alice".to_string(),
///         "alice@example.com".to_string()
///     );
///     let mut commit = Commit::new(
///         tree_oid,
///         author.clone(),
///         author,
///         "Initial commit".to_string()
///     );
///
///     // Write commit
///     let commit_oid = commit.write(&odb).await?;
///     println!("Commit OID: {}", commit_oid);
///
///     // Load commit
///     let loaded = Commit::read(&odb, &commit_oid).await?;
///     assert_eq!(loaded.message, "Initial commit");
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// OID of the tree this commit points to
    pub tree: Oid,

    /// OIDs of parent commits
    pub parents: Vec<Oid>,

    /// Author information
    pub author: Signature,

    /// Committer information
    pub committer: Signature,

    /// Commit message
    pub message: String,
}

impl Commit {
    /// Create a new commit
    ///
    /// # Arguments
    ///
    /// * `tree` - OID of the tree snapshot
    /// * `author` - Author signature
    /// * `committer` - Committer signature
    /// * `message` - Commit message
    ///
    /// # Examples
    ///
    /// ```
    /// use mediagit_versioning::{Commit, Signature, Oid};
    /// use chrono::Utc;
    ///
    /// let tree = Oid::hash(b"tree");
    /// let sig = Signature::now("Alice".to_string(), "alice@example.com".to_string());
    /// let commit = Commit::new(
    ///     tree,
    ///     sig.clone(),
    ///     sig,
    ///     "Initial commit".to_string()
    /// );
    /// assert_eq!(commit.message, "Initial commit");
    /// assert_eq!(commit.parents.len(), 0);
    /// ```
    pub fn new(
        tree: Oid,
        author: Signature,
        committer: Signature,
        message: String,
    ) -> Self {
        Self {
            tree,
            parents: Vec::new(),
            author,
            committer,
            message,
        }
    }

    /// Create a commit with parents
    pub fn with_parents(
        tree: Oid,
        parents: Vec<Oid>,
        author: Signature,
        committer: Signature,
        message: String,
    ) -> Self {
        Self {
            tree,
            parents,
            author,
            committer,
            message,
        }
    }

    /// Add a parent commit
    ///
    /// Used when building a merge commit or continuing from a previous commit.
    pub fn add_parent(&mut self, parent_oid: Oid) {
        self.parents.push(parent_oid);
    }

    /// Check if this is an initial commit (no parents)
    pub fn is_initial(&self) -> bool {
        self.parents.is_empty()
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Get the first parent (primary parent in merge commits)
    pub fn first_parent(&self) -> Option<&Oid> {
        self.parents.first()
    }

    /// Get parent count
    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    /// Get primary parent OID (first parent or None)
    pub fn parent(&self) -> Option<&Oid> {
        self.parents.first()
    }

    /// Serialize commit to bytes
    ///
    /// Uses bincode for efficient serialization.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| anyhow::anyhow!("Commit serialization failed: {}", e))
    }

    /// Deserialize commit from bytes
    pub fn deserialize(data: &[u8]) -> anyhow::Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| anyhow::anyhow!("Commit deserialization failed: {}", e))
    }

    /// Write commit to object database and return its OID
    ///
    /// # Arguments
    ///
    /// * `odb` - Object database instance
    ///
    /// # Returns
    ///
    /// The OID of the written commit
    pub async fn write(
        &self,
        odb: &crate::ObjectDatabase,
    ) -> anyhow::Result<Oid> {
        let data = self.serialize()?;
        odb.write(ObjectType::Commit, &data).await
    }

    /// Read commit from object database by OID
    ///
    /// # Arguments
    ///
    /// * `odb` - Object database instance
    /// * `oid` - Object ID of the commit
    ///
    /// # Returns
    ///
    /// The deserialized commit object
    pub async fn read(
        odb: &crate::ObjectDatabase,
        oid: &Oid,
    ) -> anyhow::Result<Self> {
        let data = odb.read(oid).await?;
        Self::deserialize(&data)
    }

    /// Get a summary of the commit (first line of message)
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Get the full message with empty line handling
    pub fn full_message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
