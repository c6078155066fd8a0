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

use crate::traits::TransportError;

/// Errors returned by [`Rpc`](crate::common::Rpc) operations.
///
/// These cover precondition failures, codec failures, and transport failures
/// of a *single* call. Application-level errors raised by a remote handler are
/// not represented here; they arrive as
/// [`ActResponse::Error`](crate::message::ActResponse::Error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The pattern has no string `topic` key.
    ///
    /// Raised before any transport interaction takes place.
    TopicRequired,

    /// No reply arrived within the configured timeout.
    Timeout,

    /// Envelope bytes could not be decoded.
    Decode(String),

    /// Envelope could not be encoded.
    Encode(String),

    /// An envelope carried both `result` and `error`.
    AmbiguousReply,

    /// The inbound message carried no reply address, so a reply cannot be sent.
    MissingReplyAddress,

    /// A construction option was rejected.
    InvalidOption(String),

    /// Any other failure reported by the transport.
    Transport(TransportError),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopicRequired => write!(f, "Topic is required"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::Decode(e) => write!(f, "Envelope decode error: {e}"),
            Self::Encode(e) => write!(f, "Envelope encode error: {e}"),
            Self::AmbiguousReply => {
                write!(f, "Envelope carries both a result and an error")
            }
            Self::MissingReplyAddress => write!(f, "Inbound message has no reply address"),
            Self::InvalidOption(e) => write!(f, "Invalid option: {e}"),
            Self::Transport(e) => write!(f, "Transport error: {e}"),
        }
    }
}

impl std::error::Error for RpcError {}

/// A transport timeout becomes [`RpcError::Timeout`]; everything else is wrapped.
impl From<TransportError> for RpcError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            other => Self::Transport(other),
        }
    }
}
