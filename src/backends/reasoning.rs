//! Reasoning backends over rig-core.
//!
//! Supports:
//! - **Anthropic**: Direct API access via rig-core
//! - **OpenAI**: Direct API access via rig-core
//!
//! Uses the rig-core crate for HTTP transport; the resulting agent is
//! wrapped behind the [`ReasoningBackend`] trait so the triage engine only
//! ever sees `complete(prompt) -> raw text`.

use std::sync::Arc;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::{CompletionModel, Prompt};
use secrecy::ExposeSecret;

use crate::backends::ReasoningBackend;
use crate::error::BackendError;

/// Supported reasoning providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningProvider {
    Anthropic,
    OpenAi,
}

impl ReasoningProvider {
    fn label(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        }
    }
}

/// Configuration for creating a reasoning backend.
#[derive(Debug, Clone)]
pub struct ReasoningConfig {
    pub provider: ReasoningProvider,
    pub api_key: secrecy::SecretString,
    pub model: String,
}

/// Create a reasoning backend from configuration.
pub fn create_reasoning_backend(
    config: &ReasoningConfig,
) -> Result<Arc<dyn ReasoningBackend>, BackendError> {
    match config.provider {
        ReasoningProvider::Anthropic => create_anthropic_backend(config),
        ReasoningProvider::OpenAi => create_openai_backend(config),
    }
}

fn create_anthropic_backend(
    config: &ReasoningConfig,
) -> Result<Arc<dyn ReasoningBackend>, BackendError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(config.api_key.expose_secret()).map_err(|e| {
            BackendError::Request {
                provider: "anthropic".to_string(),
                reason: format!("Failed to create Anthropic client: {}", e),
            }
        })?;

    let agent = client.agent(&config.model).build();
    tracing::info!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigBackend {
        agent,
        provider: ReasoningProvider::Anthropic,
    }))
}

fn create_openai_backend(
    config: &ReasoningConfig,
) -> Result<Arc<dyn ReasoningBackend>, BackendError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(config.api_key.expose_secret()).map_err(|e| {
            BackendError::Request {
                provider: "openai".to_string(),
                reason: format!("Failed to create OpenAI client: {}", e),
            }
        })?;

    let agent = client.agent(&config.model).build();
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigBackend {
        agent,
        provider: ReasoningProvider::OpenAi,
    }))
}

/// Bridges a rig agent to the [`ReasoningBackend`] trait.
struct RigBackend<M: CompletionModel + Send + Sync> {
    agent: rig::agent::Agent<M>,
    provider: ReasoningProvider,
}

#[async_trait]
impl<M: CompletionModel + Send + Sync> ReasoningBackend for RigBackend<M> {
    fn name(&self) -> &str {
        self.provider.label()
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        self.agent
            .prompt(prompt)
            .await
            .map_err(|e| BackendError::Request {
                provider: self.provider.label().to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_backend_accepts_any_key_at_construction() {
        // rig-core clients accept any string as API key at construction time.
        // The actual auth failure happens when making a request.
        let config = ReasoningConfig {
            provider: ReasoningProvider::Anthropic,
            api_key: secrecy::SecretString::from("test-key"),
            model: "claude-3-5-sonnet-latest".to_string(),
        };
        let backend = create_reasoning_backend(&config);
        assert!(backend.is_ok());
        assert_eq!(backend.unwrap().name(), "anthropic");
    }

    #[tokio::test]
    async fn create_openai_backend_labels_provider() {
        let config = ReasoningConfig {
            provider: ReasoningProvider::OpenAi,
            api_key: secrecy::SecretString::from("sk-test"),
            model: "gpt-4o".to_string(),
        };
        let backend = create_reasoning_backend(&config);
        assert!(backend.is_ok());
        assert_eq!(backend.unwrap().name(), "openai");
    }
}
