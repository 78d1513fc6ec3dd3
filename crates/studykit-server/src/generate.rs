//! Study material generation
//!
//! [`MaterialGenerator`] is the seam to the language model. [`ChatGenerator`]
//! talks to any OpenAI-compatible `/chat/completions` endpoint: one prompt per
//! artifact, JSON mode for the structured ones.

use crate::model::{
    AdditionalResource, ComplexityLevel, Flashcard, KeyTerm, LearningPath, MindMap, QuizQuestion,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenerateError {
    fn from(err: reqwest::Error) -> Self {
        GenerateError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for GenerateError {
    fn from(err: serde_json::Error) -> Self {
        GenerateError::InvalidResponse(err.to_string())
    }
}

/// Produces the study artifacts for a piece of admitted text.
///
/// The last three artifacts have defaults that report "not generated" (an
/// empty path and empty lists), so a backend only has to supply the core four.
#[async_trait::async_trait]
pub trait MaterialGenerator: Send + Sync {
    async fn summary(&self, content: &str, level: ComplexityLevel) -> Result<String, GenerateError>;

    async fn flashcards(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<Vec<Flashcard>, GenerateError>;

    async fn quiz(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<Vec<QuizQuestion>, GenerateError>;

    async fn mind_map(&self, content: &str, level: ComplexityLevel)
        -> Result<MindMap, GenerateError>;

    async fn learning_path(
        &self,
        _content: &str,
        _level: ComplexityLevel,
    ) -> Result<LearningPath, GenerateError> {
        Ok(LearningPath::default())
    }

    async fn key_terms(
        &self,
        _content: &str,
        _level: ComplexityLevel,
    ) -> Result<Vec<KeyTerm>, GenerateError> {
        Ok(Vec::new())
    }

    async fn additional_resources(
        &self,
        _content: &str,
        _level: ComplexityLevel,
    ) -> Result<Vec<AdditionalResource>, GenerateError> {
        Ok(Vec::new())
    }
}

/// Language model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL up to and including the version segment
    pub base_url: String,
    pub model: String,
    /// Usually supplied through `OPENAI_API_KEY` rather than the file
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub summary_max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            timeout_secs: 60,
            summary_max_tokens: 500,
        }
    }
}

const SUMMARY_PROMPT: &str = "You are an expert at creating clear, concise summaries. \
    Create a 2-paragraph summary that captures the key points and main ideas in plain, accessible English.";

const FLASHCARDS_PROMPT: &str = "You are an expert at creating educational flashcards. \
    Generate 5-10 question-answer pairs that help learners memorize key concepts. \
    Respond with JSON in this format: {\"flashcards\": [{\"question\": \"...\", \"answer\": \"...\"}]}";

const QUIZ_PROMPT: &str = "You are an expert at creating educational quizzes. \
    Generate exactly 5 multiple-choice questions with 4 options each. \
    Mark the correct answer index (0-3) and provide brief explanations. \
    Respond with JSON in this format: {\"questions\": [{\"question\": \"...\", \
    \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correctAnswer\": 1, \"explanation\": \"...\"}]}";

const MIND_MAP_PROMPT: &str = "You are an expert at creating mind maps. \
    Create a mind map with one central concept and 5-8 main branches, each with 1-3 subtopics. \
    Keep topics concise (1-3 words). Respond with JSON in this format: \
    {\"centralTopic\": \"Main Topic\", \"branches\": [{\"topic\": \"Branch Name\", \
    \"subtopics\": [\"Subtopic 1\", \"Subtopic 2\"]}]}";

const LEARNING_PATH_PROMPT: &str = "You are an expert curriculum designer. \
    Place the material in a wider course of study: name the current topic, the topics a learner \
    should know first, the topics to study next, and 3-6 recommended steps. \
    Rate step difficulty from 1 to 5. Respond with JSON in this format: \
    {\"currentTopic\": \"...\", \"prerequisiteTopics\": [\"...\"], \"nextTopics\": [\"...\"], \
    \"recommendedSteps\": [{\"title\": \"...\", \"description\": \"...\", \"estimatedTime\": \"30 minutes\", \
    \"difficulty\": 2, \"resources\": [\"...\"]}], \"skillLevel\": \"...\", \"totalEstimatedTime\": \"...\"}";

const KEY_TERMS_PROMPT: &str = "You are an expert at building glossaries. \
    Extract the 5-12 most important terms from the text with short definitions. \
    Rate term complexity from 1 to 5. Respond with JSON in this format: \
    {\"keyTerms\": [{\"term\": \"...\", \"definition\": \"...\", \"category\": \"...\", \
    \"relatedTerms\": [\"...\"], \"examples\": [\"...\"], \"complexity\": 2}]}";

const RESOURCES_PROMPT: &str = "You are an expert at recommending further study material. \
    Suggest 3-6 well-known, publicly available resources on the topic of the text. \
    Only use links you are confident exist. The type is one of article, video, book, course, \
    tutorial or documentation. Respond with JSON in this format: \
    {\"resources\": [{\"title\": \"...\", \"type\": \"article\", \"url\": \"https://...\", \
    \"description\": \"...\", \"difficulty\": 2, \"estimatedTime\": \"15 minutes\"}]}";

/// Shown when the model returns an empty summary
pub const EMPTY_SUMMARY: &str = "Unable to generate summary.";

/// OpenAI-compatible chat completions client
pub struct ChatGenerator {
    client: Client,
    config: LlmConfig,
}

impl ChatGenerator {
    pub fn new(config: LlmConfig) -> Result<Self, GenerateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn system_prompt(base: &str, level: ComplexityLevel) -> String {
        format!(
            "{base} The audience is at the {} level. {}",
            level.label(),
            level.guidance()
        )
    }

    /// One chat completion; returns the assistant message text
    async fn complete(
        &self,
        system: String,
        user: String,
        json_mode: bool,
        max_tokens: Option<u32>,
    ) -> Result<String, GenerateError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(GenerateError::MissingApiKey)?;

        let mut body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }
        if let Some(max_tokens) = max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let endpoint = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        debug!(url = %endpoint, model = %self.config.model, json_mode, "Requesting completion");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            warn!(status, "Completion request rejected");
            return Err(GenerateError::Api { status, message });
        }

        let completion: ChatCompletion = response.json().await?;
        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    async fn complete_json<T: serde::de::DeserializeOwned>(
        &self,
        system: String,
        user: String,
    ) -> Result<T, GenerateError> {
        let raw = self.complete(system, user, true, None).await?;
        let raw = if raw.trim().is_empty() { "{}" } else { raw.as_str() };
        Ok(serde_json::from_str(raw)?)
    }
}

#[async_trait::async_trait]
impl MaterialGenerator for ChatGenerator {
    async fn summary(&self, content: &str, level: ComplexityLevel) -> Result<String, GenerateError> {
        let summary = self
            .complete(
                Self::system_prompt(SUMMARY_PROMPT, level),
                format!("Please summarize this text in exactly 2 paragraphs using plain, clear English:\n\n{content}"),
                false,
                Some(self.config.summary_max_tokens),
            )
            .await?;
        let summary = summary.trim();
        Ok(if summary.is_empty() {
            EMPTY_SUMMARY.to_string()
        } else {
            summary.to_string()
        })
    }

    async fn flashcards(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<Vec<Flashcard>, GenerateError> {
        let envelope: FlashcardEnvelope = self
            .complete_json(
                Self::system_prompt(FLASHCARDS_PROMPT, level),
                format!("Create flashcards from this text:\n\n{content}"),
            )
            .await?;
        Ok(envelope.flashcards)
    }

    async fn quiz(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<Vec<QuizQuestion>, GenerateError> {
        let envelope: QuizEnvelope = self
            .complete_json(
                Self::system_prompt(QUIZ_PROMPT, level),
                format!("Create a 5-question multiple-choice quiz from this text:\n\n{content}"),
            )
            .await?;

        let total = envelope.questions.len();
        let questions: Vec<_> = envelope
            .questions
            .into_iter()
            .filter(QuizQuestion::is_well_formed)
            .collect();
        if questions.len() < total {
            warn!(dropped = total - questions.len(), "Dropped malformed quiz questions");
        }
        Ok(questions)
    }

    async fn mind_map(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<MindMap, GenerateError> {
        let map: Option<MindMap> = self
            .complete_json(
                Self::system_prompt(MIND_MAP_PROMPT, level),
                format!("Create a mind map structure from this text:\n\n{content}"),
            )
            .await
            .or_else(|e| match e {
                // `{}` has no centralTopic; fall back to an empty map
                GenerateError::InvalidResponse(_) => Ok(None),
                other => Err(other),
            })?;
        Ok(map.unwrap_or_default())
    }

    async fn learning_path(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<LearningPath, GenerateError> {
        self.complete_json(
            Self::system_prompt(LEARNING_PATH_PROMPT, level),
            format!("Create a learning path for this text:\n\n{content}"),
        )
        .await
    }

    async fn key_terms(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<Vec<KeyTerm>, GenerateError> {
        let envelope: KeyTermEnvelope = self
            .complete_json(
                Self::system_prompt(KEY_TERMS_PROMPT, level),
                format!("Extract the key terms from this text:\n\n{content}"),
            )
            .await?;
        Ok(envelope
            .key_terms
            .into_iter()
            .filter(|t| !t.term.trim().is_empty())
            .collect())
    }

    async fn additional_resources(
        &self,
        content: &str,
        level: ComplexityLevel,
    ) -> Result<Vec<AdditionalResource>, GenerateError> {
        let envelope: ResourceEnvelope = self
            .complete_json(
                Self::system_prompt(RESOURCES_PROMPT, level),
                format!("Recommend further resources for this text:\n\n{content}"),
            )
            .await?;

        let total = envelope.resources.len();
        let resources: Vec<_> = envelope
            .resources
            .into_iter()
            .filter(AdditionalResource::is_well_formed)
            .collect();
        if resources.len() < total {
            warn!(dropped = total - resources.len(), "Dropped resources without a usable link");
        }
        Ok(resources)
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct FlashcardEnvelope {
    #[serde(default)]
    flashcards: Vec<Flashcard>,
}

#[derive(Deserialize)]
struct QuizEnvelope {
    #[serde(default)]
    questions: Vec<QuizQuestion>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyTermEnvelope {
    #[serde(default)]
    key_terms: Vec<KeyTerm>,
}

#[derive(Deserialize)]
struct ResourceEnvelope {
    #[serde(default)]
    resources: Vec<AdditionalResource>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::Value;

    /// Answers every completion with a canned body chosen by prompt
    async fn fake_completions(Json(request): Json<Value>) -> Json<Value> {
        let system = request["messages"][0]["content"].as_str().unwrap_or_default();
        let content = if system.contains("flashcards") {
            r#"{"flashcards": [{"question": "What is ATP?", "answer": "The cell's energy currency"}]}"#
        } else if system.contains("quizzes") {
            r#"{"questions": [
                {"question": "Q1", "options": ["a", "b", "c", "d"], "correctAnswer": 2, "explanation": "c"},
                {"question": "Q2", "options": ["a", "b"], "correctAnswer": 5}
            ]}"#
        } else if system.contains("mind maps") {
            "{}"
        } else if system.contains("curriculum") {
            r#"{"currentTopic": "Cellular respiration", "prerequisiteTopics": ["Cell structure"],
                "nextTopics": ["Photosynthesis"], "skillLevel": "intermediate",
                "recommendedSteps": [{"title": "Glycolysis", "description": "Sugar splitting",
                    "estimatedTime": "20 minutes", "difficulty": 2, "resources": []}]}"#
        } else if system.contains("glossaries") {
            r#"{"keyTerms": [
                {"term": "ATP", "definition": "Energy carrier", "category": "molecule", "complexity": 2},
                {"term": " ", "definition": "blank"}
            ]}"#
        } else if system.contains("further study") {
            r#"{"resources": [
                {"title": "Cellular respiration", "type": "article", "url": "https://en.wikipedia.org/wiki/Cellular_respiration", "difficulty": 1},
                {"title": "Broken", "type": "video", "url": "not a link"}
            ]}"#
        } else {
            "  A two paragraph summary.  "
        };
        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
    }

    async fn serve() -> String {
        let router = Router::new().route("/v1/chat/completions", post(fake_completions));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn generator(base_url: String, api_key: Option<&str>) -> ChatGenerator {
        ChatGenerator::new(LlmConfig {
            base_url,
            api_key: api_key.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_generates_all_artifacts() {
        let generator = generator(serve().await, Some("test-key"));
        let level = ComplexityLevel::default();

        assert_eq!(
            generator.summary("text", level).await.unwrap(),
            "A two paragraph summary."
        );

        let cards = generator.flashcards("text", level).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, "What is ATP?");

        let quiz = generator.quiz("text", level).await.unwrap();
        assert_eq!(quiz.len(), 1);
        assert_eq!(quiz[0].correct_answer, 2);

        let map = generator.mind_map("text", level).await.unwrap();
        assert_eq!(map, MindMap::default());

        let path = generator.learning_path("text", level).await.unwrap();
        assert_eq!(path.current_topic, "Cellular respiration");
        assert_eq!(path.prerequisite_topics, vec!["Cell structure".to_string()]);
        assert_eq!(path.recommended_steps[0].estimated_time, "20 minutes");
        assert_eq!(path.total_estimated_time, "");

        let terms = generator.key_terms("text", level).await.unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].term, "ATP");
        assert!(terms[0].related_terms.is_empty());

        let resources = generator.additional_resources("text", level).await.unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].kind, crate::model::ResourceKind::Article);
    }

    #[tokio::test]
    async fn test_optional_artifacts_default_to_not_generated() {
        struct CoreOnly;

        #[async_trait::async_trait]
        impl MaterialGenerator for CoreOnly {
            async fn summary(
                &self,
                _content: &str,
                _level: ComplexityLevel,
            ) -> Result<String, GenerateError> {
                Ok(String::new())
            }

            async fn flashcards(
                &self,
                _content: &str,
                _level: ComplexityLevel,
            ) -> Result<Vec<Flashcard>, GenerateError> {
                Ok(vec![])
            }

            async fn quiz(
                &self,
                _content: &str,
                _level: ComplexityLevel,
            ) -> Result<Vec<QuizQuestion>, GenerateError> {
                Ok(vec![])
            }

            async fn mind_map(
                &self,
                _content: &str,
                _level: ComplexityLevel,
            ) -> Result<MindMap, GenerateError> {
                Ok(MindMap::default())
            }
        }

        let level = ComplexityLevel::default();
        assert!(CoreOnly.learning_path("text", level).await.unwrap().is_empty());
        assert!(CoreOnly.key_terms("text", level).await.unwrap().is_empty());
        assert!(CoreOnly.additional_resources("text", level).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let generator = generator("http://127.0.0.1:9".into(), None);
        let err = generator
            .summary("text", ComplexityLevel::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::MissingApiKey));
    }

    #[test]
    fn test_system_prompt_carries_level() {
        let prompt = ChatGenerator::system_prompt(SUMMARY_PROMPT, ComplexityLevel::new(1).unwrap());
        assert!(prompt.starts_with("You are an expert at creating clear, concise summaries."));
        assert!(prompt.contains("beginner"));
    }
}
