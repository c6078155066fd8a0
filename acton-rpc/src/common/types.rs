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

//! Defines common type aliases shared by the transport seam and the RPC layer.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::message::InboundMessage;

/// A pinned, boxed future with `Output = ()` that is `Send` and `'static`.
///
/// This is the return type of every [`MessageHandler`] invocation.
pub type FutureBox = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Callback a [`Transport`](crate::traits::Transport) invokes once per delivered message.
///
/// Shared behind an `Arc` because transports may run many invocations at once.
pub type MessageHandler = Arc<dyn Fn(InboundMessage) -> FutureBox + Send + Sync + 'static>;

/// Transport-assigned identifier of a subscription.
pub type SubscriptionId = usize;

/// Arbitrary JSON object used for `meta` and `delegate` context.
pub type Context = serde_json::Map<String, serde_json::Value>;
