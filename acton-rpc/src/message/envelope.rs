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

//! The wire envelope exchanged between requesters and responders.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::common::{correlation, Context};
use crate::message::{ActResponse, ReplyPayload, RpcError};

/// Key of the pattern entry used as the transport subject.
pub const TOPIC_KEY: &str = "topic";

/// Caller-defined descriptor of a call.
///
/// An open JSON object. The `topic` entry names the transport subject the
/// call is routed to; every other entry is opaque payload for the responder.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct Pattern(Map<String, Value>);

impl Pattern {
    /// Creates an empty pattern (which has no topic yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pattern addressed to `topic`.
    #[must_use]
    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self::new().with(TOPIC_KEY, topic.into())
    }

    /// Returns the `topic` entry.
    ///
    /// # Errors
    ///
    /// [`RpcError::TopicRequired`] if the entry is missing or not a string.
    pub fn topic(&self) -> Result<&str, RpcError> {
        self.0
            .get(TOPIC_KEY)
            .and_then(Value::as_str)
            .ok_or(RpcError::TopicRequired)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts an entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder form of [`Pattern::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the pattern, returning the underlying JSON object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Pattern {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Pattern {
    type Error = RpcError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(RpcError::Decode(format!(
                "pattern must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Structured application error carried in [`Envelope::error`].
///
/// # Wire Format
///
/// ```json
/// { "name": "DivByZero", "message": "b=0", "code": 400 }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteError {
    /// Category label.
    pub name: String,
    /// Human readable description.
    pub message: String,
    /// Numeric classification.
    pub code: i16,
}

impl RemoteError {
    /// Creates a new remote error.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>, code: i16) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.code, self.message)
    }
}

impl std::error::Error for RemoteError {}

/// Distributed tracing record.
///
/// The fields are carried for interoperability. This crate does not mint
/// trace or span ids; callers may set them through [`Envelope::with_trace`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Trace {
    /// Id shared by every span of one trace.
    pub trace_id: String,
    /// Span id of the caller.
    pub parent_span_id: String,
    /// Span id of this call.
    pub span_id: String,
    /// Start time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Logical service name.
    pub service: String,
    /// Method (usually the topic) being invoked.
    pub method: String,
    /// Duration in milliseconds.
    pub duration: i64,
}

/// Discriminates request/reply calls from fire-and-forget publications.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Request/reply semantics. This is the only value emitted by this crate.
    #[default]
    Request,
    /// Publish/subscribe semantics.
    Pubsub,
}

/// Correlation header of an envelope.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RequestHeader {
    /// Correlation id pairing a request with its reply.
    pub id: String,
    /// Call semantics.
    #[serde(rename = "type")]
    pub kind: RequestType,
}

impl RequestHeader {
    /// Creates a request header with a freshly generated correlation id.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            id: correlation::next_id(),
            kind: RequestType::Request,
        }
    }
}

/// The unit exchanged over the transport.
///
/// # Wire Format
///
/// ```json
/// {
///   "pattern": { "topic": "math.add", "a": 2, "b": 3 },
///   "meta": null,
///   "delegate": null,
///   "result": 5,
///   "trace": { "traceId": "", "parentSpanId": "", "spanId": "", "timestamp": 0,
///              "service": "", "method": "", "duration": 0 },
///   "request": { "id": "req_01h9xz7n2e5p6q8r3t1u2v3w4x", "type": "request" },
///   "error": null
/// }
/// ```
///
/// Every field is optional when decoding, so `{}` decodes to
/// `Envelope::default()`. At most one of `result` and `error` may be set;
/// [`Envelope::to_bytes`] refuses anything else.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Envelope {
    /// Payload of the call.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pattern: Pattern,

    /// Call-scoped metadata, forwarded untouched.
    #[serde(default)]
    pub meta: Option<Context>,

    /// Delegation context, forwarded untouched.
    #[serde(default)]
    pub delegate: Option<Context>,

    /// Success payload of a reply.
    #[serde(default)]
    pub result: Option<Value>,

    /// Tracing record.
    #[serde(default, deserialize_with = "null_as_default")]
    pub trace: Trace,

    /// Correlation header.
    #[serde(default, deserialize_with = "null_as_default")]
    pub request: RequestHeader,

    /// Failure payload of a reply.
    #[serde(default)]
    pub error: Option<RemoteError>,
}

/// Decodes an explicit JSON `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl Envelope {
    /// Creates a request envelope for `pattern` with a fresh correlation id.
    #[must_use]
    pub fn request(pattern: Pattern) -> Self {
        Self {
            pattern,
            request: RequestHeader::fresh(),
            ..Self::default()
        }
    }

    /// Creates the reply to `request` carrying `payload`.
    ///
    /// The reply keeps the request's correlation id, pattern, meta and
    /// delegate context. A request without an id gets a fresh one.
    #[must_use]
    pub fn reply(request: &Self, payload: ReplyPayload) -> Self {
        let header = if request.request.id.is_empty() {
            RequestHeader::fresh()
        } else {
            RequestHeader {
                id: request.request.id.clone(),
                kind: RequestType::Request,
            }
        };

        let (result, error) = match payload {
            ReplyPayload::Result(value) => (Some(value), None),
            ReplyPayload::Error(err) => (None, Some(err)),
        };

        Self {
            pattern: request.pattern.clone(),
            meta: request.meta.clone(),
            delegate: request.delegate.clone(),
            result,
            trace: request.trace.clone(),
            request: header,
            error,
        }
    }

    /// Replaces the pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Sets the call metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: Context) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Sets the delegation context.
    #[must_use]
    pub fn with_delegate(mut self, delegate: Context) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Sets the tracing record.
    #[must_use]
    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }

    /// Returns the correlation id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.request.id
    }

    /// Discriminates a decoded reply into its outcome.
    ///
    /// A reply with neither `result` nor `error` is an empty success and
    /// yields `ActResponse::Result(Value::Null)`.
    ///
    /// # Errors
    ///
    /// [`RpcError::AmbiguousReply`] if both `result` and `error` are set.
    pub fn into_response(self) -> Result<ActResponse, RpcError> {
        match (self.result, self.error) {
            (Some(_), Some(_)) => Err(RpcError::AmbiguousReply),
            (None, Some(err)) => Ok(ActResponse::Error(err)),
            (result, None) => Ok(ActResponse::Result(result.unwrap_or(Value::Null))),
        }
    }

    /// Encodes the envelope as JSON bytes.
    ///
    /// # Errors
    ///
    /// [`RpcError::AmbiguousReply`] if both `result` and `error` are set, or
    /// [`RpcError::Encode`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RpcError> {
        if self.result.is_some() && self.error.is_some() {
            return Err(RpcError::AmbiguousReply);
        }
        serde_json::to_vec(self).map_err(|e| RpcError::Encode(e.to_string()))
    }

    /// Decodes an envelope from JSON bytes.
    ///
    /// # Errors
    ///
    /// [`RpcError::Decode`] if the bytes are not a valid envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RpcError> {
        serde_json::from_slice(bytes).map_err(|e| RpcError::Decode(e.to_string()))
    }
}
