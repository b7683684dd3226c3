//! Chat-completions wire types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System { content: String },
    User { content: Vec<ContentPart> },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    pub detail: &'static str,
}

impl ChatRequest {
    /// One system message, then one user message with the instruction text and
    /// a single PNG screenshot.
    pub fn vision(
        model: &str,
        system_prompt: &str,
        instruction: &str,
        png_base64: &str,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage::System {
                    content: system_prompt.to_string(),
                },
                ChatMessage::User {
                    content: vec![
                        ContentPart::Text {
                            text: instruction.to_string(),
                        },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl {
                                url: format!("data:image/png;base64,{png_base64}"),
                                detail: "high",
                            },
                        },
                    ],
                },
            ],
            max_tokens,
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageUrl> {
        self.messages.iter().flat_map(|message| match message {
            ChatMessage::User { content } => content.as_slice(),
            ChatMessage::System { .. } => &[][..],
        })
        .filter_map(|part| match part {
            ContentPart::ImageUrl { image_url } => Some(image_url),
            ContentPart::Text { .. } => None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// The parts of a response the overlay cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// First choice's text, or `None` when the body carries no usable content.
    pub fn into_completion(self) -> Option<ChatCompletion> {
        let usage = self.usage;
        let choice = self.choices.into_iter().next()?;
        Some(ChatCompletion {
            text: choice.message.content?,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vision_request_matches_the_wire_format() {
        let request = ChatRequest::vision("gpt-4o", "be helpful", "solve this", "AAAA", 16384);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4o",
                "messages": [
                    { "role": "system", "content": "be helpful" },
                    {
                        "role": "user",
                        "content": [
                            { "type": "text", "text": "solve this" },
                            {
                                "type": "image_url",
                                "image_url": {
                                    "url": "data:image/png;base64,AAAA",
                                    "detail": "high"
                                }
                            }
                        ]
                    }
                ],
                "max_tokens": 16384
            })
        );
        assert_eq!(request.images().count(), 1);
    }

    #[test]
    fn completion_takes_the_first_choice() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                { "message": { "content": "Answer text" }, "finish_reason": "stop" },
                { "message": { "content": "ignored" } }
            ],
            "usage": { "prompt_tokens": 900, "completion_tokens": 100, "total_tokens": 1000 }
        }))
        .unwrap();

        let completion = response.into_completion().unwrap();
        assert_eq!(completion.text, "Answer text");
        assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
        assert_eq!(completion.usage.unwrap().total_tokens, 1000);
    }

    #[test]
    fn missing_content_has_no_completion() {
        let empty: ChatResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(empty.into_completion().is_none());

        let null: ChatResponse =
            serde_json::from_value(json!({ "choices": [{ "message": { "content": null } }] }))
                .unwrap();
        assert!(null.into_completion().is_none());
    }
}
