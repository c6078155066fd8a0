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

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, instrument, trace, warn};

use crate::common::config::{RpcConfig, CONFIG};
use crate::common::options::{timeout, RpcOption, RpcOptions};
use crate::common::{FutureBox, MessageHandler, Subscription};
use crate::message::{
    ActResponse, Envelope, InboundMessage, Pattern, RemoteError, Reply, ReplyPayload,
    RequestHeader, RpcError,
};
use crate::traits::Transport;

/// Name of the remote error sent back when a request cannot be decoded.
pub const DECODE_ERROR_NAME: &str = "DecodeError";

/// Code of the remote error sent back when a request cannot be decoded.
pub const DECODE_ERROR_CODE: i16 = 400;

/// Request/reply calls over a publish-subscribe [`Transport`].
///
/// *   [`Rpc::add`] registers a responder for a topic. Responders added for the
///     same topic (in this or other processes) form a queue group, so each call
///     is served by exactly one of them.
/// *   [`Rpc::act`] calls a topic and waits, up to the configured timeout, for
///     the reply.
///
/// Cloning is cheap: clones share the transport handle.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use std::time::Duration;
/// use acton_rpc::prelude::*;
///
/// let rpc = Rpc::new(Arc::new(LocalTransport::new()), [timeout(Duration::from_millis(500))])?;
///
/// rpc.add(Pattern::with_topic("math.add"), |pattern, reply| async move {
///     let a = pattern.get("a").and_then(|v| v.as_i64()).unwrap_or_default();
///     let b = pattern.get("b").and_then(|v| v.as_i64()).unwrap_or_default();
///     let _ = reply.ok(&(a + b)).await;
/// })
/// .await?;
///
/// rpc.act(Pattern::with_topic("math.add").with("a", 2).with("b", 3), |response| {
///     assert_eq!(response.result(), Some(&serde_json::json!(5)));
/// })
/// .await?;
/// ```
#[derive(Debug, Clone)]
pub struct Rpc {
    transport: Arc<dyn Transport>,
    options: RpcOptions,
}

impl Rpc {
    /// Creates an instance over `transport`, applying `options` to the defaults.
    ///
    /// # Errors
    ///
    /// [`RpcError::InvalidOption`] (or whatever an option returns) if an option
    /// is rejected.
    pub fn new(
        transport: Arc<dyn Transport>,
        options: impl IntoIterator<Item = RpcOption>,
    ) -> Result<Self, RpcError> {
        let options = RpcOptions::default().apply(options)?;
        Ok(Self { transport, options })
    }

    /// Creates an instance whose defaults come from `config`.
    ///
    /// Explicit `options` are applied after the configuration values.
    ///
    /// # Errors
    ///
    /// As [`Rpc::new`]; a zero timeout in `config` is rejected as well.
    pub fn from_config(
        transport: Arc<dyn Transport>,
        config: &RpcConfig,
        options: impl IntoIterator<Item = RpcOption>,
    ) -> Result<Self, RpcError> {
        Self::new(
            transport,
            std::iter::once(timeout(config.act_timeout())).chain(options),
        )
    }

    /// Creates an instance whose defaults come from the process-wide
    /// [`CONFIG`], loaded once from `$XDG_CONFIG_HOME/acton/rpc.toml`.
    ///
    /// # Errors
    ///
    /// As [`Rpc::from_config`].
    pub fn with_global_config(
        transport: Arc<dyn Transport>,
        options: impl IntoIterator<Item = RpcOption>,
    ) -> Result<Self, RpcError> {
        Self::from_config(transport, &CONFIG, options)
    }

    /// Returns the options in effect.
    #[must_use]
    pub const fn options(&self) -> &RpcOptions {
        &self.options
    }

    /// Returns the shared transport handle.
    #[must_use]
    pub const fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Registers `handler` as a responder for the pattern's topic.
    ///
    /// The subscription uses the topic as its queue group. For every inbound
    /// call the request envelope is decoded and `handler` is invoked with the
    /// call's pattern and a one-shot [`Reply`]. Calls are handled concurrently.
    /// Replies carry `pattern` (the one registered here), not the caller's.
    ///
    /// A request that cannot be decoded never reaches `handler`; the caller
    /// receives a `DecodeError` [`RemoteError`] instead.
    ///
    /// # Errors
    ///
    /// [`RpcError::TopicRequired`] if `pattern` has no string `topic` (nothing
    /// is subscribed), or the transport's subscribe error.
    #[instrument(skip(self, handler))]
    pub async fn add<F, Fut>(&self, pattern: Pattern, handler: F) -> Result<Subscription, RpcError>
    where
        F: Fn(Pattern, Reply) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let topic = pattern.topic()?.to_string();
        let registered = Arc::new(pattern);
        let handler = Arc::new(handler);
        let transport = self.transport.clone();

        let on_message: MessageHandler = Arc::new(move |message: InboundMessage| -> FutureBox {
            let handler = handler.clone();
            let transport = transport.clone();
            let registered = registered.clone();
            Box::pin(async move {
                let Some(request) = decode_request(&transport, &registered, &message).await else {
                    return;
                };
                trace!(correlation_id = %request.id(), subject = %message.subject, "Dispatching request to responder");
                let pattern = request.pattern.clone();
                let reply = Reply::new(transport, (*registered).clone(), request, message.reply_to);
                handler(pattern, reply).await;
            })
        });

        let id = self
            .transport
            .subscribe(&topic, Some(&topic), on_message)
            .await?;
        debug!(%topic, id, "Responder added");
        Ok(Subscription::new(topic, id, self.transport.clone()))
    }

    /// Calls the pattern's topic and hands the outcome to `handler`.
    ///
    /// `handler` runs exactly once per completed round trip, with
    /// [`ActResponse::Error`] if the responder replied with an error and
    /// [`ActResponse::Result`] otherwise. It is not invoked when the call
    /// itself fails.
    ///
    /// # Errors
    ///
    /// [`RpcError::TopicRequired`] before any I/O if `pattern` has no string
    /// `topic`; [`RpcError::Timeout`] if no reply arrives in time; decode or
    /// transport errors otherwise.
    #[instrument(skip(self, handler))]
    pub async fn act<F>(&self, pattern: Pattern, handler: F) -> Result<(), RpcError>
    where
        F: FnOnce(ActResponse),
    {
        let response = self.call(Envelope::request(pattern)).await?;
        handler(response);
        Ok(())
    }

    /// Sends a prepared request envelope and returns the outcome.
    ///
    /// Use this to attach `meta`, `delegate` or `trace` to a call. An
    /// envelope without a correlation id gets a fresh one.
    ///
    /// # Errors
    ///
    /// As [`Rpc::act`].
    pub async fn call(&self, envelope: Envelope) -> Result<ActResponse, RpcError> {
        self.call_with_timeout(envelope, self.options.timeout).await
    }

    /// As [`Rpc::call`], with a timeout for this call only.
    ///
    /// # Errors
    ///
    /// As [`Rpc::act`].
    pub async fn call_with_timeout(
        &self,
        mut envelope: Envelope,
        timeout: Duration,
    ) -> Result<ActResponse, RpcError> {
        let topic = envelope.pattern.topic()?.to_string();
        if envelope.request.id.is_empty() {
            envelope.request = RequestHeader::fresh();
        }
        let payload = envelope.to_bytes()?;

        trace!(correlation_id = %envelope.id(), %topic, ?timeout, "Sending request");
        let reply_bytes = self
            .transport
            .request(&topic, payload, timeout)
            .await
            .map_err(|err| {
                debug!(correlation_id = %envelope.id(), %topic, error = %err, "Request failed");
                RpcError::from(err)
            })?;

        let reply = Envelope::from_bytes(&reply_bytes)?;
        if !reply.id().is_empty() && reply.id() != envelope.id() {
            warn!(
                correlation_id = %envelope.id(),
                reply_id = %reply.id(),
                "Reply carries a different correlation id"
            );
        }
        reply.into_response()
    }
}

/// Decodes an inbound request, answering the caller with a `DecodeError` if
/// the bytes are not a valid envelope.
async fn decode_request(
    transport: &Arc<dyn Transport>,
    registered: &Pattern,
    message: &InboundMessage,
) -> Option<Envelope> {
    let err = match Envelope::from_bytes(&message.payload) {
        Ok(request) => return Some(request),
        Err(err) => err,
    };

    warn!(subject = %message.subject, error = %err, "Rejecting undecodable request");
    let Some(reply_to) = message.reply_to.as_deref() else {
        return None;
    };

    let rejection = Envelope::reply(
        &Envelope::default(),
        ReplyPayload::Error(RemoteError::new(
            DECODE_ERROR_NAME,
            err.to_string(),
            DECODE_ERROR_CODE,
        )),
    )
    .with_pattern(registered.clone());
    let published = match rejection.to_bytes() {
        Ok(bytes) => transport.publish(reply_to, bytes).await.map_err(RpcError::from),
        Err(e) => Err(e),
    };
    if let Err(e) = published {
        error!(subject = %message.subject, error = %e, "Failed to send decode error reply");
    }
    None
}
