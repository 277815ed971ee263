//! HTTP client for the card-generation AI.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint (DeepSeek by
//! default). The model is asked for a JSON array of {front, back} objects;
//! because models sometimes wrap the array in prose, extraction falls back
//! to the outermost bracketed slice before giving up.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{self, AiConfig};
use crate::error::{ApiError, ApiResult};

/// Requested difficulty of the generated cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Prompt profile: topic depth and word budgets per side.
    fn profile(&self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile {
                description: "basic concepts and simple definitions",
                front_max_words: 10,
                back_max_words: 5,
                instructions: "The \"front\" must be a simple question or basic concept (at most \
                               10 words). The \"back\" must be a very short, direct answer (at \
                               most 5 words). Example: Front: \"What is X?\" Back: \"X is Y\"",
            },
            Self::Medium => DifficultyProfile {
                description: "intermediate concepts and relations between ideas",
                front_max_words: 15,
                back_max_words: 15,
                instructions: "The \"front\" must be an intermediate question or concept (at most \
                               15 words). The \"back\" must be an explanation in one full \
                               sentence (at most 15 words). Example: Front: \"How does X work?\" \
                               Back: \"X works through Y because Z\"",
            },
            Self::Hard => DifficultyProfile {
                description: "advanced concepts, deep analysis and complex applications",
                front_max_words: 20,
                back_max_words: 25,
                instructions: "The \"front\" must be a complex question or advanced concept (at \
                               most 20 words). The \"back\" must be a detailed explanation with \
                               deep analysis (at most 25 words). Example: Front: \"What is the \
                               relation between X and Y and how does it apply to Z?\" Back: \"The \
                               relation between X and Y rests on A, B and C, enabling Z through D \
                               and E\"",
            },
        }
    }
}

struct DifficultyProfile {
    description: &'static str,
    front_max_words: usize,
    back_max_words: usize,
    instructions: &'static str,
}

/// One generated card as returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedCard {
    pub front: String,
    pub back: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the chat-completions service.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AiClient {
    pub fn new(config: &AiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config::UPSTREAM_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Upstream)?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Generate up to `num_cards` cards from the reference text.
    pub async fn generate_cards(
        &self,
        text: &str,
        num_cards: usize,
        difficulty: Difficulty,
    ) -> ApiResult<Vec<GeneratedCard>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are an expert assistant for creating educational content. You \
                              always respond with valid JSON."
                        .to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(text, num_cards, difficulty),
                },
            ],
            temperature: 0.7,
            max_tokens: 4000,
        };

        tracing::debug!(
            "requesting {} {} cards from {}",
            num_cards,
            difficulty.as_str(),
            self.api_url
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ApiError::Upstream)?;

        if !response.status().is_success() {
            return Err(ApiError::UpstreamStatus(format!(
                "AI service returned {}",
                response.status()
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(ApiError::Upstream)?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::AiResponse("response contained no choices".to_string()))?;

        let mut cards = extract_cards(&content)?;
        cards.truncate(num_cards);
        if cards.is_empty() {
            return Err(ApiError::AiResponse("response contained no cards".to_string()));
        }
        Ok(cards)
    }
}

/// Build the generation prompt for the given text and difficulty.
fn build_prompt(text: &str, num_cards: usize, difficulty: Difficulty) -> String {
    let profile = difficulty.profile();
    format!(
        "You are an expert at creating educational study cards. Based on the following text, \
         generate exactly {num_cards} study cards of difficulty: {description}.\n\n\
         Reference text:\n{text}\n\n\
         Response format (JSON array):\n\
         [\n  {{\n    \"front\": \"Question or concept\",\n    \"back\": \"Answer or explanation\"\n  }}\n]\n\n\
         STRICT DIFFICULTY RULES ({difficulty}):\n{instructions}\n\n\
         IMPORTANT:\n\
         - Generate exactly {num_cards} cards\n\
         - Every card must be clear and educational\n\
         - STRICTLY respect the word limits: front at most {front_max} words, back at most {back_max} words\n\
         - The cards must cover the most important concepts in the text\n\
         - Respond ONLY with the JSON array, no extra text or explanations outside the JSON",
        num_cards = num_cards,
        description = profile.description,
        text = text,
        difficulty = difficulty.as_str().to_uppercase(),
        instructions = profile.instructions,
        front_max = profile.front_max_words,
        back_max = profile.back_max_words,
    )
}

/// Pull the card array out of the model's reply.
fn extract_cards(content: &str) -> ApiResult<Vec<GeneratedCard>> {
    // Prefer the outermost bracketed slice; models like to add prose around it
    let slice = match (content.find('['), content.rfind(']')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content,
    };

    serde_json::from_str(slice).map_err(|e| {
        let preview: String = content.chars().take(200).collect();
        tracing::warn!("unparseable AI response: {} ({})", preview, e);
        ApiError::AiResponse(e.to_string())
    })
}
