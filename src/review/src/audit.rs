// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Audit log format: one structured entry per step a post goes through.

use chrono::{DateTime, Utc};
use policy_classifier::{Severity, Status, ViolationKind};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::info;
use uuid::Uuid;

use crate::{Bucket, StoredPost, AUDIT_SCHEMA};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditEvent {
    Submitted,
    Analyzed,
    Decided,
    Reported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Entry schema version
    pub schema: String,

    pub audit_id: Uuid,

    pub post_id: Uuid,

    pub timestamp: DateTime<Utc>,

    pub event: AuditEvent,

    /// Bucket after the step
    pub bucket: Bucket,

    pub status: Option<Status>,

    pub priority: Option<Severity>,

    /// Violation kinds on the current verdict
    pub kinds: Vec<ViolationKind>,

    /// Moderator decision, for `Decided` entries
    pub decision: Option<String>,

    /// Backend that produced the current verdict
    pub backend: Option<String>,

    /// Hash of the post content (lets a log be checked without storing text)
    pub content_hash: String,
}

impl AuditEntry {
    pub fn from_post(event: AuditEvent, post: &StoredPost, decision: Option<&str>) -> Self {
        let mut hasher = DefaultHasher::new();
        post.post.content.hash(&mut hasher);
        let content_hash = format!("{:016x}", hasher.finish());

        Self {
            schema: AUDIT_SCHEMA.to_string(),
            audit_id: Uuid::new_v4(),
            post_id: post.id,
            timestamp: Utc::now(),
            event,
            bucket: post.bucket,
            status: post.verdict.as_ref().map(|v| v.status),
            priority: post.verdict.as_ref().map(|v| v.priority),
            kinds: post
                .verdict
                .as_ref()
                .map(|v| v.kinds())
                .unwrap_or_default(),
            decision: decision.map(str::to_string),
            backend: post.backend.clone(),
            content_hash,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write the entry to the `audit` tracing target.
    pub fn emit(&self) {
        info!(
            target: "audit",
            audit_id = %self.audit_id,
            post_id = %self.post_id,
            event = ?self.event,
            bucket = ?self.bucket,
            priority = ?self.priority,
            decision = self.decision.as_deref().unwrap_or("-"),
            backend = self.backend.as_deref().unwrap_or("-"),
            content_hash = %self.content_hash,
            "moderation audit"
        );
    }
}
