//! Model selection and sampling settings.

use tutorly_types::config::LlmConfig;
use tutorly_types::llm::{CompletionRequest, Message};

/// The knobs every completion request is built with.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl ModelSettings {
    /// Build a completion request for `messages`.
    pub fn request(&self, messages: Vec<Message>, stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            messages,
            system: None,
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
            stream,
        }
    }

    /// Single user-message request, used for one-shot prompts.
    pub fn prompt(&self, prompt: impl Into<String>) -> CompletionRequest {
        self.request(vec![Message::user(prompt)], false)
    }
}

impl From<&LlmConfig> for ModelSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorly_types::llm::MessageRole;

    #[test]
    fn test_settings_from_config() {
        let config = LlmConfig {
            model: "llama3.1".to_string(),
            temperature: 0.3,
            max_tokens: 512,
            ..LlmConfig::default()
        };
        let settings = ModelSettings::from(&config);
        let request = settings.prompt("hi");
        assert_eq!(request.model, "llama3.1");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, 512);
        assert!(!request.stream);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
    }
}
