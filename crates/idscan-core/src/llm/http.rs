//! HTTP client for hosted vision models.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::ModelError;
use crate::models::config::{ModelApi, ModelConfig};

use super::{ModelRequest, VisionModel};

/// Vision model reached over HTTP, speaking either supported wire format.
pub struct HttpVisionModel {
    client: Client,
    api: ModelApi,
    base_url: String,
    model: String,
    api_key: Option<String>,
    anthropic_version: String,
}

impl HttpVisionModel {
    /// Build a client from configuration, reading the API key from the environment.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());

        if api_key.is_none() && config.api == ModelApi::Anthropic {
            return Err(ModelError::Setup(format!(
                "environment variable {} is not set",
                config.api_key_env
            )));
        }

        Self::new(config, api_key)
    }

    /// Build a client with an explicit API key.
    pub fn new(config: &ModelConfig, api_key: Option<String>) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            api: config.api,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            anthropic_version: config.anthropic_version.clone(),
        })
    }

    fn endpoint(&self) -> String {
        match self.api {
            ModelApi::Anthropic => format!("{}/v1/messages", self.base_url),
            ModelApi::Openai => format!("{}/v1/chat/completions", self.base_url),
        }
    }

    /// JSON body for one request in the configured wire format.
    pub fn request_body(&self, request: &ModelRequest) -> Value {
        let params = &request.params;
        match self.api {
            ModelApi::Anthropic => json!({
                "model": self.model,
                "max_tokens": params.max_tokens,
                "temperature": params.temperature,
                "top_p": params.top_p,
                "messages": [
                    {
                        "role": "user",
                        "content": [
                            {
                                "type": "image",
                                "source": {
                                    "type": "base64",
                                    "media_type": request.image.media_type,
                                    "data": request.image.data
                                }
                            },
                            {
                                "type": "text",
                                "text": request.prompt
                            }
                        ]
                    }
                ]
            }),
            ModelApi::Openai => json!({
                "model": self.model,
                "max_tokens": params.max_tokens,
                "temperature": params.temperature,
                "top_p": params.top_p,
                "stream": false,
                "messages": [
                    {
                        "role": "user",
                        "content": [
                            {
                                "type": "image_url",
                                "image_url": { "url": request.image.data_uri() }
                            },
                            {
                                "type": "text",
                                "text": request.prompt
                            }
                        ]
                    }
                ]
            }),
        }
    }
}

#[async_trait]
impl VisionModel for HttpVisionModel {
    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let url = self.endpoint();
        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.request_body(request));

        builder = match (self.api, &self.api_key) {
            (ModelApi::Anthropic, Some(key)) => builder
                .header("x-api-key", key)
                .header("anthropic-version", &self.anthropic_version),
            (ModelApi::Anthropic, None) => {
                builder.header("anthropic-version", &self.anthropic_version)
            }
            (ModelApi::Openai, Some(key)) => builder.bearer_auth(key),
            (ModelApi::Openai, None) => builder,
        };

        debug!("POST {} (model {})", url, self.model);

        let response = builder
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response
            .bytes()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let answer = match self.api {
            ModelApi::Anthropic => parse_messages_answer(&raw),
            ModelApi::Openai => parse_chat_answer(&raw),
        };

        if let Err(ref e) = answer {
            error!(
                raw_response = %String::from_utf8_lossy(&raw),
                "Failed to read model answer: {}", e
            );
        }

        answer
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Text of the first text block of a Messages API response.
fn parse_messages_answer(raw: &[u8]) -> Result<String, ModelError> {
    let response: MessagesResponse =
        serde_json::from_slice(raw).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or_else(|| ModelError::InvalidResponse("no text block in response".to_string()))
}

/// Content of the first choice of a chat completions response.
fn parse_chat_answer(raw: &[u8]) -> Result<String, ModelError> {
    let completion: ChatCompletion =
        serde_json::from_slice(raw).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ModelError::InvalidResponse("no choices in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::prompt::GenerationParams;
    use crate::imaging::PreparedImage;

    fn request() -> ModelRequest {
        ModelRequest {
            image: PreparedImage {
                media_type: "image/jpeg".to_string(),
                data: "/9j/AAAA".to_string(),
            },
            prompt: "extract".to_string(),
            params: GenerationParams::default(),
        }
    }

    fn model(api: ModelApi) -> HttpVisionModel {
        let config = ModelConfig {
            api,
            base_url: "http://localhost:8080/".to_string(),
            ..ModelConfig::default()
        };
        HttpVisionModel::new(&config, Some("test-key".to_string())).unwrap()
    }

    #[test]
    fn test_messages_body() {
        let model = model(ModelApi::Anthropic);
        let body = model.request_body(&request());

        assert_eq!(model.endpoint(), "http://localhost:8080/v1/messages");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["top_p"], 1.0);

        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[0]["source"]["data"], "/9j/AAAA");
        assert_eq!(content[1]["text"], "extract");
    }

    #[test]
    fn test_chat_body() {
        let model = model(ModelApi::Openai);
        let body = model.request_body(&request());

        assert_eq!(model.endpoint(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(body["stream"], false);

        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["image_url"]["url"], "data:image/jpeg;base64,/9j/AAAA");
        assert_eq!(content[1]["type"], "text");
    }

    #[test]
    fn test_parse_messages_answer() {
        let raw = br#"{"id":"msg_1","content":[{"type":"text","text":"Name: Jane Doe"}],"stop_reason":"end_turn"}"#;
        assert_eq!(parse_messages_answer(raw).unwrap(), "Name: Jane Doe");

        let empty = br#"{"content":[]}"#;
        assert!(matches!(
            parse_messages_answer(empty),
            Err(ModelError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_parse_chat_answer() {
        let raw = br#"{"choices":[{"index":0,"message":{"role":"assistant","content":"CPF: 123"}}]}"#;
        assert_eq!(parse_chat_answer(raw).unwrap(), "CPF: 123");

        assert!(matches!(
            parse_chat_answer(b"<html>bad gateway</html>"),
            Err(ModelError::InvalidResponse(_))
        ));
    }
}
