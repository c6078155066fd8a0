/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! In-process publish-subscribe transport.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::{debug, instrument, trace};

use crate::common::{correlation, MessageHandler, SubscriptionId};
use crate::message::InboundMessage;
use crate::traits::{Transport, TransportError};

/// Subject prefix of the per-request reply inboxes.
pub const INBOX_PREFIX: &str = "_INBOX.";

/// Delivery counters for a [`LocalTransport`].
#[derive(Debug, Default)]
pub struct LocalTransportStats {
    /// Messages published, including requests.
    pub published: AtomicUsize,
    /// Handler invocations scheduled.
    pub delivered: AtomicUsize,
    /// Replies handed to a waiting request.
    pub replies_routed: AtomicUsize,
    /// Replies discarded because their request had already given up.
    pub late_replies_dropped: AtomicUsize,
}

impl LocalTransportStats {
    /// Get the number of published messages.
    #[must_use]
    pub fn published(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }

    /// Get the number of handler invocations scheduled.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Get the number of replies routed to a waiting request.
    #[must_use]
    pub fn replies_routed(&self) -> usize {
        self.replies_routed.load(Ordering::Relaxed)
    }

    /// Get the number of late replies dropped.
    #[must_use]
    pub fn late_replies_dropped(&self) -> usize {
        self.late_replies_dropped.load(Ordering::Relaxed)
    }
}

/// A registered subscriber.
struct LocalSubscription {
    id: SubscriptionId,
    queue_group: Option<String>,
    handler: MessageHandler,
}

impl fmt::Debug for LocalSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSubscription")
            .field("id", &self.id)
            .field("queue_group", &self.queue_group)
            .finish_non_exhaustive()
    }
}

/// Subscribers of one subject.
#[derive(Debug, Default)]
struct SubjectSubscribers {
    members: Vec<LocalSubscription>,
    /// Next turn of each queue group on this subject.
    rotations: HashMap<String, AtomicUsize>,
}

impl SubjectSubscribers {
    fn remove(&mut self, id: SubscriptionId) {
        self.members.retain(|subscription| subscription.id != id);
        let members = &self.members;
        self.rotations.retain(|group, _| {
            members
                .iter()
                .any(|subscription| subscription.queue_group.as_deref() == Some(group.as_str()))
        });
    }
}

#[derive(Default)]
struct LocalTransportInner {
    /// Subscribers keyed by subject.
    subjects: DashMap<String, SubjectSubscribers>,
    /// Reverse index used by `unsubscribe`.
    subscription_subjects: DashMap<SubscriptionId, String>,
    /// Reply inboxes of in-flight requests.
    inboxes: DashMap<String, oneshot::Sender<Vec<u8>>>,
    next_subscription_id: AtomicUsize,
    stats: LocalTransportStats,
}

/// An in-process pub/sub bus implementing [`Transport`].
///
/// Subscribers without a queue group each receive every message published on
/// their subject. Subscribers sharing a queue group compete: each message goes
/// to exactly one of them, rotated round-robin within the group. Every
/// delivery runs on its own Tokio task, so handlers execute concurrently.
///
/// `request` publishes with a private reply inbox and waits on it; once the
/// request returns, the inbox is gone and any reply published to it is
/// dropped. A request to a subject nobody listens on waits out its full
/// timeout.
///
/// Cloning is cheap; clones share the same bus.
#[derive(Clone, Default)]
pub struct LocalTransport {
    inner: Arc<LocalTransportInner>,
}

impl fmt::Debug for LocalTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTransport")
            .field("subject_count", &self.inner.subjects.len())
            .field("pending_requests", &self.inner.inboxes.len())
            .field("stats", &self.inner.stats)
            .finish()
    }
}

/// Removes a request's inbox however the request future ends.
struct InboxGuard {
    inner: Arc<LocalTransportInner>,
    inbox: String,
}

impl Drop for InboxGuard {
    fn drop(&mut self) {
        self.inner.inboxes.remove(&self.inbox);
    }
}

impl LocalTransport {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the delivery counters.
    #[must_use]
    pub fn stats(&self) -> &LocalTransportStats {
        &self.inner.stats
    }

    /// Number of subscribers currently registered on `subject`.
    #[must_use]
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.inner.subjects.get(subject).map_or(0, |subs| subs.members.len())
    }

    /// Number of requests currently waiting for a reply.
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.inner.inboxes.len()
    }

    /// Routes one message: to a waiting request if the subject is its inbox,
    /// otherwise to the subject's subscribers.
    fn dispatch(&self, message: InboundMessage) {
        let stats = &self.inner.stats;

        if let Some((_, sender)) = self.inner.inboxes.remove(&message.subject) {
            if sender.send(message.payload).is_ok() {
                stats.replies_routed.fetch_add(1, Ordering::Relaxed);
                trace!(inbox = %message.subject, "Reply routed to waiting request");
            } else {
                stats.late_replies_dropped.fetch_add(1, Ordering::Relaxed);
                trace!(inbox = %message.subject, "Request gave up before its reply arrived");
            }
            return;
        }

        if message.subject.starts_with(INBOX_PREFIX) {
            stats.late_replies_dropped.fetch_add(1, Ordering::Relaxed);
            debug!(inbox = %message.subject, "Discarding reply for a request that is no longer waiting");
            return;
        }

        let handlers = self.select_handlers(&message.subject);
        if handlers.is_empty() {
            trace!(subject = %message.subject, "No subscribers found for subject");
            return;
        }

        trace!(subject = %message.subject, count = handlers.len(), "Delivering message");
        for handler in handlers {
            stats.delivered.fetch_add(1, Ordering::Relaxed);
            tokio::spawn(handler(message.clone()));
        }
    }

    /// Picks every ungrouped subscriber plus one member of each queue group.
    fn select_handlers(&self, subject: &str) -> Vec<MessageHandler> {
        let Some(subscribers) = self.inner.subjects.get(subject) else {
            return Vec::new();
        };

        let mut handlers = Vec::with_capacity(subscribers.members.len());
        let mut groups: HashMap<&str, Vec<&LocalSubscription>> = HashMap::new();
        for subscription in &subscribers.members {
            match subscription.queue_group.as_deref() {
                None => handlers.push(subscription.handler.clone()),
                Some(group) => groups.entry(group).or_default().push(subscription),
            }
        }

        for (group, members) in groups {
            let turn = subscribers
                .rotations
                .get(group)
                .map_or(0, |rotation| rotation.fetch_add(1, Ordering::Relaxed));
            handlers.push(members[turn % members.len()].handler.clone());
        }
        handlers
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.inner.stats.published.fetch_add(1, Ordering::Relaxed);
        self.dispatch(InboundMessage::new(subject, payload));
        Ok(())
    }

    #[instrument(skip(self, handler))]
    async fn subscribe(
        &self,
        subject: &str,
        queue_group: Option<&str>,
        handler: MessageHandler,
    ) -> Result<SubscriptionId, TransportError> {
        let id = self.inner.next_subscription_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut subscribers = self.inner.subjects.entry(subject.to_string()).or_default();
        if let Some(group) = queue_group {
            subscribers.rotations.entry(group.to_string()).or_default();
        }
        subscribers.members.push(LocalSubscription {
            id,
            queue_group: queue_group.map(str::to_string),
            handler,
        });
        drop(subscribers);
        self.inner
            .subscription_subjects
            .insert(id, subject.to_string());
        trace!(id, "Subscription added");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), TransportError> {
        let Some((_, subject)) = self.inner.subscription_subjects.remove(&id) else {
            return Err(TransportError::UnknownSubscription(id));
        };

        if let Some(mut subscribers) = self.inner.subjects.get_mut(&subject) {
            subscribers.remove(id);
        }
        self.inner
            .subjects
            .remove_if(&subject, |_, subscribers| subscribers.members.is_empty());
        trace!(%subject, "Subscription removed");
        Ok(())
    }

    #[instrument(skip(self, payload))]
    async fn request(
        &self,
        subject: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let inbox = format!("{INBOX_PREFIX}{}", correlation::next_id());
        let (sender, receiver) = oneshot::channel();
        self.inner.inboxes.insert(inbox.clone(), sender);
        let _guard = InboxGuard {
            inner: self.inner.clone(),
            inbox: inbox.clone(),
        };

        self.inner.stats.published.fetch_add(1, Ordering::Relaxed);
        self.dispatch(InboundMessage::new(subject, payload).with_reply_to(inbox));

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(_)) => Err(TransportError::Closed),
            Err(_) => {
                debug!(?timeout, "Request timed out");
                Err(TransportError::Timeout)
            }
        }
    }
}
