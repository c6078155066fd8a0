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

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::common::{MessageHandler, SubscriptionId};

/// Errors reported by a [`Transport`] implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// A request received no reply within its deadline.
    Timeout,

    /// The transport (or the reply channel of a request) was closed.
    Closed,

    /// The subscription id is not known to the transport.
    UnknownSubscription(SubscriptionId),

    /// Connection or I/O level failure.
    Io(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "Request timeout"),
            Self::Closed => write!(f, "Transport closed"),
            Self::UnknownSubscription(id) => write!(f, "Unknown subscription: {id}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// The publish-subscribe capability the RPC layer is built on.
///
/// Implementations own connection management, subject routing, queue-group
/// balancing and delivery. They must be safe to share across tasks; the RPC
/// layer holds a single `Arc<dyn Transport>` for all responders and requesters
/// in a process.
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    /// Publishes `payload` on `subject` without expecting a reply.
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Registers `handler` for every message published on `subject`.
    ///
    /// Subscribers that share a `queue_group` compete: each message is handed
    /// to exactly one member of the group. Handler invocations may run
    /// concurrently.
    async fn subscribe(
        &self,
        subject: &str,
        queue_group: Option<&str>,
        handler: MessageHandler,
    ) -> Result<SubscriptionId, TransportError>;

    /// Removes a subscription created by [`Transport::subscribe`].
    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), TransportError>;

    /// Publishes `payload` on `subject` and waits for exactly one reply.
    ///
    /// Fails with [`TransportError::Timeout`] if nothing arrives within
    /// `timeout`. A reply arriving after that is discarded.
    async fn request(
        &self,
        subject: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, TransportError>;
}
