use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::user::{
        ActivityLevel, DietaryPreference, FitnessGoal, Identity, UserProfile,
    },
};

pub const MAX_MESSAGE_CHARS: usize = 1000;
pub const MAX_SUGGESTIONS: usize = 8;

const UNCONFIGURED_REPLY: &str =
    "I'm having trouble connecting to the AI service. Please try again later.";
const UNCONFIGURED_DETAIL: &str = "AI service is not configured. Please contact administrator.";
const FAILED_REPLY: &str = "I'm having trouble connecting right now. Please try again later.";
const FAILED_DETAIL: &str = "Internal server error";

const BASE_SUGGESTIONS: [&str; 8] = [
    "How do I set up my workout routine?",
    "What's a good beginner workout plan?",
    "Can you suggest healthy recipes for weight loss?",
    "How can I track my nutrition effectively?",
    "What exercises are best for building muscle?",
    "How do I stay motivated with my fitness goals?",
    "Can you create a meal plan for my dietary preferences?",
    "What's the best way to track my progress?",
];

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// `user` or `assistant`.
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, rename = "conversationHistory")]
    pub conversation_history: Vec<ConversationMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub recipes: Option<Vec<Recipe>>,
    pub timestamp: DateTime<Utc>,
    pub message: Option<String>,
}

// ============================================================================
// Collaborator
// ============================================================================

/// What the coach knows about the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachContext {
    pub name: String,
    pub fitness_goal: Option<FitnessGoal>,
    pub activity_level: Option<ActivityLevel>,
    pub dietary_preferences: Vec<DietaryPreference>,
    pub allergies: Vec<String>,
}

impl CoachContext {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let name = profile
            .first_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("there")
            .to_string();
        Self {
            name,
            fitness_goal: profile.fitness_goal,
            activity_level: profile.activity_level,
            dietary_preferences: profile.dietary_preferences.clone(),
            allergies: profile.allergies.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoachReply {
    pub response: String,
    pub recipes: Option<Vec<Recipe>>,
}

/// Conversational AI backend.
#[async_trait]
pub trait CoachClient: Send + Sync {
    async fn reply(
        &self,
        context: &CoachContext,
        history: &[ConversationMessage],
        message: &str,
    ) -> AppResult<CoachReply>;
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct CoachUseCases {
    client: Arc<dyn CoachClient>,
}

impl CoachUseCases {
    pub fn new(client: Arc<dyn CoachClient>) -> Self {
        Self { client }
    }

    /// Answer a chat message. Input errors fail the request; collaborator
    /// failures come back as `success: false` with a user-facing reply.
    pub async fn chat(&self, identity: &Identity, request: ChatRequest) -> AppResult<ChatResponse> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(AppError::InvalidInput("Message is required".into()));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::InvalidInput(format!(
                "Message must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let context = CoachContext::from_profile(identity.profile());
        let reply = self
            .client
            .reply(&context, &request.conversation_history, message)
            .await;

        Ok(match reply {
            Ok(reply) => ChatResponse {
                success: true,
                response: reply.response,
                recipes: reply.recipes,
                timestamp: Utc::now(),
                message: None,
            },
            Err(err) => {
                let (response, detail) = match &err {
                    AppError::ServiceUnavailable(_) => (UNCONFIGURED_REPLY, UNCONFIGURED_DETAIL),
                    _ => (FAILED_REPLY, FAILED_DETAIL),
                };
                tracing::warn!(error = %err, "Coach reply failed");
                ChatResponse {
                    success: false,
                    response: response.to_string(),
                    recipes: None,
                    timestamp: Utc::now(),
                    message: Some(detail.to_string()),
                }
            }
        })
    }

    /// Suggested opening questions, goal- and diet-specific ones first.
    pub fn suggestions(&self, profile: &UserProfile) -> Vec<String> {
        let mut suggestions = BASE_SUGGESTIONS.map(String::from).to_vec();

        match profile.fitness_goal {
            Some(FitnessGoal::WeightLoss) => {
                suggestions.insert(0, "What are effective weight loss strategies?".into());
                suggestions.insert(1, "Can you suggest low-calorie recipes?".into());
            }
            Some(FitnessGoal::MuscleGain) => {
                suggestions.insert(0, "How much protein should I eat for muscle gain?".into());
                suggestions.insert(1, "What's a good strength training routine?".into());
            }
            _ => {}
        }

        if let Some(diet) = profile
            .dietary_preferences
            .iter()
            .find(|pref| **pref != DietaryPreference::None)
        {
            let diet = diet.as_ref().replace('_', "-");
            suggestions.insert(0, format!("Can you suggest {diet} recipes?"));
        }

        suggestions.truncate(MAX_SUGGESTIONS);
        suggestions
    }
}
