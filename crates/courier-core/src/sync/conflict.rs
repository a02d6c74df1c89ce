//! Interactive merge-conflict resolution
//!
//! The sync engine hands conflicts to a [`ConflictResolver`]. The channel
//! implementation forwards them to whoever holds the [`ConflictInbox`] (the UI
//! or the CLI) and waits for the reply, bounded by a timeout and a
//! cancellation token.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Pending conflict requests the inbox may buffer before senders wait
const INBOX_CAPACITY: usize = 8;

/// A document that changed on both sides of a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeConflict {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub message: String,
    pub mine_blob: Option<String>,
    pub theirs_blob: Option<String>,
    /// Blob picked by the user, `None` while unresolved
    #[serde(default)]
    pub choose: Option<String>,
}

impl MergeConflict {
    pub fn choose_mine(mut self) -> Self {
        self.choose = self.mine_blob.clone();
        self
    }

    pub fn choose_theirs(mut self) -> Self {
        self.choose = self.theirs_blob.clone();
        self
    }
}

/// How a non-interactive caller answers every conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    #[default]
    Ours,
    Theirs,
}

impl ConflictPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ours" | "mine" => Some(Self::Ours),
            "theirs" => Some(Self::Theirs),
            _ => None,
        }
    }

    pub fn apply(self, conflicts: Vec<MergeConflict>) -> Vec<MergeConflict> {
        conflicts
            .into_iter()
            .map(|c| match self {
                Self::Ours => c.choose_mine(),
                Self::Theirs => c.choose_theirs(),
            })
            .collect()
    }
}

#[async_trait]
pub trait ConflictResolver: Send + Sync {
    /// Suspend until the conflicts have been answered
    async fn resolve(&self, conflicts: Vec<MergeConflict>) -> Result<Vec<MergeConflict>>;
}

/// Conflicts awaiting an answer
#[derive(Debug)]
pub struct ConflictRequest {
    pub conflicts: Vec<MergeConflict>,
    reply: oneshot::Sender<Vec<MergeConflict>>,
}

impl ConflictRequest {
    pub fn respond(self, resolved: Vec<MergeConflict>) {
        if self.reply.send(resolved).is_err() {
            debug!("Conflict requester went away before the reply");
        }
    }
}

/// Receiving end owned by the interactive layer
#[derive(Debug)]
pub struct ConflictInbox {
    receiver: mpsc::Receiver<ConflictRequest>,
}

impl ConflictInbox {
    pub async fn next(&mut self) -> Option<ConflictRequest> {
        self.receiver.recv().await
    }
}

#[derive(Debug, Clone)]
pub struct ChannelConflictResolver {
    sender: mpsc::Sender<ConflictRequest>,
    timeout: Duration,
    cancel: CancellationToken,
}

/// Create a connected resolver/inbox pair
pub fn conflict_channel(
    timeout: Duration,
    cancel: CancellationToken,
) -> (ChannelConflictResolver, ConflictInbox) {
    let (sender, receiver) = mpsc::channel(INBOX_CAPACITY);
    (
        ChannelConflictResolver {
            sender,
            timeout,
            cancel,
        },
        ConflictInbox { receiver },
    )
}

impl ChannelConflictResolver {
    async fn exchange(&self, conflicts: Vec<MergeConflict>) -> Vec<MergeConflict> {
        let (reply, response) = oneshot::channel();
        if self
            .sender
            .send(ConflictRequest { conflicts, reply })
            .await
            .is_err()
        {
            warn!("No one is listening for merge conflicts, leaving them unresolved");
            return Vec::new();
        }
        // A dropped reply is a prompt closed without choices
        response.await.unwrap_or_default()
    }
}

#[async_trait]
impl ConflictResolver for ChannelConflictResolver {
    async fn resolve(&self, conflicts: Vec<MergeConflict>) -> Result<Vec<MergeConflict>> {
        if conflicts.is_empty() {
            return Ok(conflicts);
        }
        debug!(count = conflicts.len(), "Waiting for conflict resolution");

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::ConflictResolutionCancelled),
            outcome = tokio::time::timeout(self.timeout, self.exchange(conflicts)) => {
                outcome.map_err(|_| Error::ConflictResolutionTimeout(self.timeout.as_secs()))
            }
        }
    }
}
