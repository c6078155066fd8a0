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

#![forbid(unsafe_code)]
#![forbid(missing_docs)] // Keep this to enforce coverage

//! # Acton RPC
//!
//! Correlated, timeout-bounded request/reply calls over a publish-subscribe
//! transport, built on Tokio.
//!
//! ## Key Concepts
//!
//! - **Envelope (`Envelope`)**: The self-describing JSON unit on the wire. It carries
//!   the call's `Pattern`, opaque `meta` and `delegate` context, a tracing record, a
//!   correlation header, and either a `result` or an `error`, never both.
//! - **Responders (`Rpc::add`)**: Handlers bound to a topic through a queue-group
//!   subscription. Responders for the same topic compete for calls.
//! - **Requesters (`Rpc::act`)**: Calls that publish a request and wait, up to a
//!   timeout, for one reply. Remote application errors arrive as
//!   `ActResponse::Error`; call failures (`RpcError`) are returned.
//! - **Transport (`Transport`)**: The publish-subscribe capability consumed by the
//!   layer. `LocalTransport` is the in-process implementation.
//! - **Options (`timeout`)**: Functional options applied at construction, seeded
//!   from `RpcConfig` if desired.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use acton_rpc::prelude::*;
//!
//! let rpc = Rpc::new(Arc::new(LocalTransport::new()), [])?;
//! rpc.add(Pattern::with_topic("greet"), |_pattern, reply| async move {
//!     let _ = reply.ok("hello").await;
//! })
//! .await?;
//! rpc.act(Pattern::with_topic("greet"), |response| println!("{response:?}")).await?;
//! ```

/// Runtime components: the RPC instance, options, configuration and the local transport.
pub(crate) mod common;

/// Defines the envelope model, replies, responses and errors.
pub(crate) mod message;

/// Defines the transport seam.
pub(crate) mod traits;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## External Crates
/// *   [`async_trait::async_trait`](https://docs.rs/async-trait/latest/async_trait/attr.async_trait.html): Needed to implement [`Transport`](crate::traits::Transport).
///
/// ## Core Types
/// *   [`crate::common::Rpc`]: Registers responders and issues calls.
/// *   [`crate::common::Subscription`]: Handle to a registered responder.
/// *   [`crate::common::LocalTransport`]: In-process pub/sub bus.
/// *   [`crate::common::timeout`]: The timeout option.
/// *   [`crate::common::RpcConfig`]: File-based configuration.
/// *   [`crate::message::Envelope`]: The wire envelope.
/// *   [`crate::message::Pattern`]: The call descriptor.
/// *   [`crate::message::Reply`]: One-shot responder reply handle.
/// *   [`crate::message::ActResponse`]: Outcome delivered to requesters.
/// *   [`crate::message::RemoteError`]: Structured application error.
/// *   [`crate::message::RpcError`]: Call failures.
/// *   [`crate::traits::Transport`]: The transport seam.
pub mod prelude {
    // External crate re-exports
    pub use async_trait::async_trait;

    // Core types
    pub use crate::common::{
        correlation, timeout, Context, FutureBox, LocalTransport, LocalTransportStats,
        MessageHandler, Rpc, RpcConfig, RpcOption, RpcOptions, Subscription, SubscriptionId,
        TimeoutConfig, CONFIG, DECODE_ERROR_CODE, DECODE_ERROR_NAME, DEFAULT_ACT_TIMEOUT_MS,
        INBOX_PREFIX,
    };
    pub use crate::message::{
        ActResponse, Envelope, InboundMessage, Pattern, RemoteError, Reply, ReplyPayload,
        RequestHeader, RequestType, RpcError, Trace, TOPIC_KEY,
    };
    pub use crate::traits::{Transport, TransportError};
}
