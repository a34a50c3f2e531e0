use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `user_profiles` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub custom_ai_name: Option<String>,
    pub selected_ai_assistant: Option<String>,
    pub ai_assistant_configured: bool,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountProfile {
    pub fn new(id: String, email: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            display_name,
            custom_ai_name: None,
            selected_ai_assistant: None,
            ai_assistant_configured: false,
            onboarding_completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive match on email or display name. `lower_query` must be lowercase.
    pub fn matches(&self, lower_query: &str) -> bool {
        self.email.to_lowercase().contains(lower_query)
            || self
                .display_name
                .as_deref()
                .map_or(false, |n| n.to_lowercase().contains(lower_query))
    }
}

/// Admin-managed model settings for an assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub model_provider: String,
    pub model_name: String,
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfigInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_provider")]
    pub model_provider: String,
    #[serde(default = "default_model")]
    pub model_name: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_provider() -> String {
    "groq".to_string()
}

fn default_model() -> String {
    "llama-3.1-70b-versatile".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_active() -> bool {
    true
}

impl AssistantConfigInput {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            model_provider: default_provider(),
            model_name: default_model(),
            system_prompt: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            is_active: default_active(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Assistant config name must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".to_string());
        }
        Ok(())
    }
}

impl AssistantConfig {
    pub fn new(input: AssistantConfigInput) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            model_provider: input.model_provider,
            model_name: input.model_name,
            system_prompt: input.system_prompt,
            max_tokens: input.max_tokens,
            temperature: input.temperature,
            is_active: input.is_active,
            created_at: Utc::now(),
        }
    }
}
