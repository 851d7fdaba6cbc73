//! Candidate-answer suggestions from an OpenAI-compatible chat endpoint.
//!
//! [`Suggester::suggest`] never fails. When no API key is configured, or the
//! remote call errors, times out, or returns something that is not the
//! expected JSON, the caller gets [`fallback_suggestions`] instead and the
//! cause is logged at `warn`.

use std::time::Duration;

use askline_types::Suggestion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default chat-completions endpoint.
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// Default model name sent with every request.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

const SYSTEM_PROMPT: &str = "You are a technical Q&A assistant. Generate helpful, accurate, \
and concise answers to technical questions. Provide clear, well-structured answers, include \
code examples when they help, and focus on practical, actionable information. If the question \
is unclear, ask for clarification. If you are not sure about something, say so.";

const FALLBACK_ANSWERS: [&str; 3] = [
    "I understand you're asking about this topic. Could you provide more specific details about what you'd like to know?",
    "This is an interesting question. To provide a more accurate answer, could you clarify your specific requirements or concerns?",
    "I'd be happy to help with this. Could you share more context about what you're trying to achieve?",
];

const FALLBACK_APPROACH: &str = "General guidance";
const DEFAULT_APPROACH: &str = "General answer";
const FALLBACK_SCORE: f64 = 0.5;
const GENERATED_SCORE: f64 = 1.0;

/// Remote endpoint and generation parameters.
#[derive(Debug, Clone)]
pub struct SuggesterConfig {
    pub api_url: String,
    /// Bearer token. Empty disables remote calls.
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub num_suggestions: usize,
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(20),
            num_suggestions: 3,
        }
    }
}

#[derive(Debug, Error)]
enum SuggestError {
    #[error("no API key configured")]
    NoApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {0}")]
    Status(reqwest::StatusCode),
    #[error("response had no choices")]
    NoChoices,
    #[error("malformed suggestion content: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("upstream returned no suggestions")]
    Empty,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct SuggestionList {
    suggestions: Vec<RawSuggestion>,
}

#[derive(Deserialize)]
struct RawSuggestion {
    answer: String,
    #[serde(default)]
    approach: Option<String>,
}

/// Client for the suggestion endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Suggester {
    client: reqwest::Client,
    config: SuggesterConfig,
}

impl Suggester {
    pub fn new(config: SuggesterConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("askline/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    pub fn config(&self) -> &SuggesterConfig {
        &self.config
    }

    /// Proposes candidate answers for `question`.
    pub async fn suggest(&self, question: &str) -> Vec<Suggestion> {
        match self.generate(question).await {
            Ok(suggestions) => suggestions,
            Err(SuggestError::NoApiKey) => {
                tracing::debug!("suggester has no API key, using fallback");
                fallback_suggestions(self.config.num_suggestions)
            }
            Err(e) => {
                tracing::warn!("suggestion request failed, using fallback: {}", e);
                fallback_suggestions(self.config.num_suggestions)
            }
        }
    }

    async fn generate(&self, question: &str) -> Result<Vec<Suggestion>, SuggestError> {
        if self.config.api_key.is_empty() {
            return Err(SuggestError::NoApiKey);
        }

        let prompt = user_prompt(question, self.config.num_suggestions);
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SuggestError::Status(status));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .ok_or(SuggestError::NoChoices)?
            .message
            .content;

        parse_suggestions(&content)
    }
}

/// The first `n` canned clarification prompts.
pub fn fallback_suggestions(n: usize) -> Vec<Suggestion> {
    FALLBACK_ANSWERS
        .iter()
        .take(n)
        .map(|answer| Suggestion {
            answer: (*answer).to_string(),
            relevance_score: FALLBACK_SCORE,
            approach: FALLBACK_APPROACH.to_string(),
        })
        .collect()
}

fn user_prompt(question: &str, n: usize) -> String {
    format!(
        "Given the following technical question, generate {n} different but relevant answers. \
Each answer should be unique and offer a different insight or approach.\n\n\
Question: {question}\n\n\
Reply with JSON only, in this format:\n\
{{\"suggestions\": [{{\"answer\": \"...\", \"approach\": \"brief description of this approach\"}}]}}"
    )
}

fn parse_suggestions(content: &str) -> Result<Vec<Suggestion>, SuggestError> {
    let list: SuggestionList = serde_json::from_str(strip_code_fence(content))?;
    if list.suggestions.is_empty() {
        return Err(SuggestError::Empty);
    }
    Ok(list
        .suggestions
        .into_iter()
        .map(|raw| Suggestion {
            answer: raw.answer,
            relevance_score: GENERATED_SCORE,
            approach: raw
                .approach
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_APPROACH.to_string()),
        })
        .collect())
}

// Models often wrap JSON in a markdown fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_capped_at_three() {
        let all = fallback_suggestions(10);
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|s| s.relevance_score == 0.5));
        assert!(all.iter().all(|s| s.approach == "General guidance"));

        assert_eq!(fallback_suggestions(1).len(), 1);
        assert!(fallback_suggestions(0).is_empty());
    }

    #[test]
    fn parses_suggestions_and_defaults_approach() {
        let content = r#"{"suggestions": [
            {"answer": "Use an Arc.", "approach": "Shared ownership"},
            {"answer": "Clone it."}
        ]}"#;
        let parsed = parse_suggestions(content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].approach, "Shared ownership");
        assert_eq!(parsed[1].approach, "General answer");
        assert!(parsed.iter().all(|s| s.relevance_score == 1.0));
    }

    #[test]
    fn accepts_fenced_json() {
        let content = "```json\n{\"suggestions\": [{\"answer\": \"a\", \"approach\": \"b\"}]}\n```";
        let parsed = parse_suggestions(content).unwrap();
        assert_eq!(parsed[0].answer, "a");
    }

    #[test]
    fn rejects_prose_and_wrong_shape() {
        assert!(matches!(
            parse_suggestions("Sure! Here are some answers."),
            Err(SuggestError::Malformed(_))
        ));
        assert!(matches!(
            parse_suggestions(r#"{"answers": []}"#),
            Err(SuggestError::Malformed(_))
        ));
        assert!(matches!(
            parse_suggestions(r#"{"suggestions": []}"#),
            Err(SuggestError::Empty)
        ));
    }

    #[test]
    fn prompt_mentions_count_and_question() {
        let prompt = user_prompt("What is Pin?", 4);
        assert!(prompt.contains("generate 4 different"));
        assert!(prompt.contains("Question: What is Pin?"));
    }

    #[tokio::test]
    async fn no_api_key_returns_fallback() {
        let suggester = Suggester::new(SuggesterConfig::default());
        let suggestions = suggester.suggest("anything").await;
        assert_eq!(suggestions, fallback_suggestions(3));
    }
}
