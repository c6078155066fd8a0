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

use serde::Serialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::common::Context;
use crate::message::{Envelope, Pattern, RemoteError, RpcError};
use crate::traits::Transport;

/// What a responder hands to [`Reply::send`].
#[derive(Clone, Debug, PartialEq)]
pub enum ReplyPayload {
    /// Success payload, encoded into the reply's `result`.
    Result(Value),
    /// Application error, encoded into the reply's `error`.
    Error(RemoteError),
}

impl From<Value> for ReplyPayload {
    fn from(value: Value) -> Self {
        Self::Result(value)
    }
}

impl From<RemoteError> for ReplyPayload {
    fn from(err: RemoteError) -> Self {
        Self::Error(err)
    }
}

impl From<Result<Value, RemoteError>> for ReplyPayload {
    fn from(outcome: Result<Value, RemoteError>) -> Self {
        match outcome {
            Ok(value) => Self::Result(value),
            Err(err) => Self::Error(err),
        }
    }
}

/// One-shot reply handle passed to a responder handler.
///
/// Sending consumes the handle, so a call is answered at most once. A handler
/// that drops the handle without sending leaves the requester to time out.
///
/// The reply carries the responder's registration pattern together with the
/// call's correlation id, meta and delegate context.
#[derive(Debug)]
pub struct Reply {
    transport: Arc<dyn Transport>,
    pattern: Pattern,
    request: Envelope,
    reply_to: Option<String>,
}

impl Reply {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        pattern: Pattern,
        request: Envelope,
        reply_to: Option<String>,
    ) -> Self {
        Self {
            transport,
            pattern,
            request,
            reply_to,
        }
    }

    /// Correlation id of the call being answered.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        self.request.id()
    }

    /// Metadata sent with the call.
    #[must_use]
    pub const fn meta(&self) -> Option<&Context> {
        self.request.meta.as_ref()
    }

    /// Delegation context sent with the call.
    #[must_use]
    pub const fn delegate(&self) -> Option<&Context> {
        self.request.delegate.as_ref()
    }

    /// Publishes the reply to the caller's reply address.
    ///
    /// A [`RemoteError`] becomes the reply's `error`; anything else becomes
    /// its `result`.
    ///
    /// # Errors
    ///
    /// [`RpcError::MissingReplyAddress`] if the inbound message had no reply
    /// address, or the encoding/transport error that prevented publishing.
    pub async fn send(self, payload: impl Into<ReplyPayload>) -> Result<(), RpcError> {
        let Some(reply_to) = self.reply_to.as_deref() else {
            warn!(correlation_id = %self.request.id(), "Dropping reply: inbound message had no reply address");
            return Err(RpcError::MissingReplyAddress);
        };

        let envelope = Envelope::reply(&self.request, payload.into()).with_pattern(self.pattern);
        let bytes = envelope.to_bytes()?;
        self.transport.publish(reply_to, bytes).await?;
        trace!(
            correlation_id = %envelope.id(),
            reply_to,
            is_error = envelope.error.is_some(),
            "Reply published"
        );
        Ok(())
    }

    /// Serializes `value` and sends it as the result.
    ///
    /// # Errors
    ///
    /// [`RpcError::Encode`] if `value` cannot be serialized, otherwise as
    /// [`Reply::send`].
    pub async fn ok<T: Serialize + ?Sized>(self, value: &T) -> Result<(), RpcError> {
        let value = serde_json::to_value(value).map_err(|e| RpcError::Encode(e.to_string()))?;
        self.send(value).await
    }

    /// Sends `err` as the reply's error.
    ///
    /// # Errors
    ///
    /// As [`Reply::send`].
    pub async fn error(self, err: RemoteError) -> Result<(), RpcError> {
        self.send(err).await
    }
}
