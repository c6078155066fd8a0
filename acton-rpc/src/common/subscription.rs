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

use std::sync::Arc;

use tracing::debug;

use crate::common::SubscriptionId;
use crate::message::RpcError;
use crate::traits::Transport;

/// Handle to a responder registered with [`Rpc::add`](crate::common::Rpc::add).
///
/// Dropping the handle does not remove the responder; call
/// [`Subscription::unsubscribe`] for that.
#[derive(Debug, Clone)]
pub struct Subscription {
    topic: String,
    id: SubscriptionId,
    transport: Arc<dyn Transport>,
}

impl Subscription {
    pub(crate) fn new(topic: String, id: SubscriptionId, transport: Arc<dyn Transport>) -> Self {
        Self {
            topic,
            id,
            transport,
        }
    }

    /// Topic the responder listens on.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Transport-assigned subscription id.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes the responder from the transport.
    ///
    /// # Errors
    ///
    /// The transport error if the subscription could not be removed.
    pub async fn unsubscribe(self) -> Result<(), RpcError> {
        self.transport.unsubscribe(self.id).await?;
        debug!(topic = %self.topic, id = self.id, "Responder removed");
        Ok(())
    }
}
