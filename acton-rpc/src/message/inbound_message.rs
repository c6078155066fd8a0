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

/// A raw message handed to a subscription by the transport.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Subject the message was published on.
    pub subject: String,
    /// Undecoded message bytes.
    pub payload: Vec<u8>,
    /// Address a reply should be published to, if the sender expects one.
    pub reply_to: Option<String>,
}

impl InboundMessage {
    /// Creates a message with no reply address.
    #[must_use]
    pub fn new(subject: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            subject: subject.into(),
            payload,
            reply_to: None,
        }
    }

    /// Sets the reply address.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}
