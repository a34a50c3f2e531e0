use crate::domain::ports::completion_port::{CompletionProvider, CompletionRequest};

/// Offline provider. Returns a fixed reply, or echoes the prompt when none is set.
#[derive(Debug, Clone, Default)]
pub struct CannedProvider {
    reply: Option<String>,
}

impl CannedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, String> {
        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => format!("[offline] {}", request.prompt),
        })
    }
}
