//! Defines the data exchanged by the RPC layer.
//!
//! # Key Components
//!
//! *   [`Envelope`]: The self-describing JSON unit exchanged over the transport, with
//!     its parts [`Pattern`], [`RequestHeader`], [`Trace`] and [`RemoteError`].
//! *   [`Reply`]: One-shot handle a responder uses to answer a call.
//! *   [`ActResponse`]: Outcome delivered to a requester's handler.
//! *   [`RpcError`]: Failures of a single call.
//! *   [`InboundMessage`]: Raw message handed to a subscription by a transport.

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

// --- Public Re-exports ---
pub use act_response::ActResponse;
pub use envelope::{
    Envelope, Pattern, RemoteError, RequestHeader, RequestType, Trace, TOPIC_KEY,
};
pub use inbound_message::InboundMessage;
pub use reply::{Reply, ReplyPayload};
pub use rpc_error::RpcError;

// --- Submodules ---

/// Defines [`ActResponse`].
mod act_response;
/// Defines [`Envelope`] and its parts.
mod envelope;
/// Defines [`InboundMessage`].
mod inbound_message;
/// Defines [`Reply`] and [`ReplyPayload`].
mod reply;
/// Defines [`RpcError`].
mod rpc_error;
