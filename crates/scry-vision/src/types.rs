//! Wire types for the chat-completions vision request.

use serde::{Deserialize, Serialize};

/// Outbound request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation — a single user message for this use case.
    pub messages: Vec<ChatMessage>,
    /// Response length cap; descriptions are short.
    pub max_tokens: u32,
}

/// One chat message with mixed text/image content.
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    /// Message role (`user`).
    pub role: &'static str,
    /// Content parts.
    pub content: Vec<ContentPart>,
}

/// One part of a message's content.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text part.
    Text {
        /// The text.
        text: String,
    },
    /// Inline image part.
    ImageUrl {
        /// The image reference.
        image_url: ImageUrl,
    },
}

/// Image reference — a `data:` URI for inline JPEG.
#[derive(Debug, Serialize)]
pub struct ImageUrl {
    /// The URI.
    pub url: String,
}

/// Inbound response body. Only the fields we read are modeled.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Completion choices; the first one carries the answer.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The assistant message.
    pub message: ResponseMessage,
}

/// The assistant message within a choice.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    /// The text content, if any.
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_expected_shape() {
        let req = ChatRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: "what is this".into() },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: "data:image/jpeg;base64,AAAA".into() },
                    },
                ],
            }],
            max_tokens: 100,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["type"], "text");
        assert_eq!(json["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            json["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn response_parses_nested_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"arm"}}]}"#;
        let resp: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("arm"));
    }

    #[test]
    fn response_tolerates_missing_choices() {
        let resp: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.choices.is_empty());
    }
}
