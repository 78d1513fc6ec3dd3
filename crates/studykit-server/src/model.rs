//! Learning content records and the study materials attached to them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use studykit_extract::ExtractedContent;

/// Desired sophistication of generated material, 1 (beginner) to 5 (academic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct ComplexityLevel(u8);

impl ComplexityLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// `None` outside 1..=5
    pub fn new(level: i64) -> Option<Self> {
        (i64::from(Self::MIN)..=i64::from(Self::MAX))
            .contains(&level)
            .then_some(Self(level as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "beginner",
            2 => "intermediate",
            3 => "advanced",
            4 => "expert",
            _ => "academic",
        }
    }

    /// Audience description used in prompts
    pub fn guidance(self) -> &'static str {
        match self.0 {
            1 => "Use everyday words, short sentences and concrete examples. Assume no prior knowledge.",
            2 => "Use plain language and introduce key terms with short definitions.",
            3 => "Assume general familiarity with the subject and use its standard terminology.",
            4 => "Write for practitioners: be precise, dense and technical where it helps.",
            _ => "Write at a scholarly level: rigorous, nuanced, with attention to underlying theory.",
        }
    }
}

impl Default for ComplexityLevel {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<i64> for ComplexityLevel {
    type Error = String;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        Self::new(level).ok_or_else(|| {
            format!(
                "Complexity level must be between {} and {}",
                Self::MIN,
                Self::MAX
            )
        })
    }
}

impl From<ComplexityLevel> for u8 {
    fn from(level: ComplexityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// Four options and an answer index that points at one of them
    pub fn is_well_formed(&self) -> bool {
        self.options.len() == 4 && self.correct_answer < self.options.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMap {
    pub central_topic: String,
    #[serde(default)]
    pub branches: Vec<MindMapBranch>,
}

impl Default for MindMap {
    fn default() -> Self {
        Self {
            central_topic: "Topic".to_string(),
            branches: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapBranch {
    pub topic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

/// One step of a suggested study sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningStep {
    pub title: String,
    pub description: String,
    /// Free text, e.g. "30 minutes"
    pub estimated_time: String,
    /// 1 (easy) to 5 (hard)
    pub difficulty: f32,
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Where the content sits in a wider course of study
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningPath {
    pub current_topic: String,
    pub prerequisite_topics: Vec<String>,
    pub next_topics: Vec<String>,
    pub recommended_steps: Vec<LearningStep>,
    pub skill_level: String,
    pub total_estimated_time: String,
}

impl LearningPath {
    pub fn is_empty(&self) -> bool {
        self.current_topic.is_empty() && self.recommended_steps.is_empty()
    }
}

/// A glossary entry drawn from the content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyTerm {
    pub term: String,
    pub definition: String,
    pub category: String,
    pub related_terms: Vec<String>,
    pub examples: Vec<String>,
    /// 1 (basic) to 5 (specialist)
    pub complexity: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Article,
    Video,
    Book,
    Course,
    Tutorial,
    Documentation,
    #[serde(other)]
    Other,
}

/// Further reading or viewing suggested for the content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdditionalResource {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub url: String,
    pub description: String,
    pub difficulty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl AdditionalResource {
    /// Has a title and an absolute http(s) link
    pub fn is_well_formed(&self) -> bool {
        !self.title.trim().is_empty()
            && url::Url::parse(&self.url)
                .is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}

/// Everything the generator produces for one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Materials {
    pub summary: String,
    pub flashcards: Vec<Flashcard>,
    pub quiz: Vec<QuizQuestion>,
    pub mind_map: MindMap,
    pub learning_path: LearningPath,
    pub key_terms: Vec<KeyTerm>,
    pub additional_resources: Vec<AdditionalResource>,
}

/// Fields supplied when a record is created
#[derive(Debug, Clone)]
pub struct NewContent {
    pub original_content: String,
    pub content_type: String,
    pub complexity_level: ComplexityLevel,
    pub title: Option<String>,
    pub source: Option<String>,
}

impl NewContent {
    /// Record admitted text together with its detected type
    pub fn from_extracted(content: &ExtractedContent, complexity_level: ComplexityLevel) -> Self {
        Self {
            original_content: content.text.clone(),
            content_type: content.content_type.as_str().to_string(),
            complexity_level,
            title: content.title.clone(),
            source: (content.content_type.as_str() != "text").then(|| content.source.clone()),
        }
    }
}

/// A processed piece of content and, once generated, its study materials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningContent {
    pub id: u64,
    pub original_content: String,
    pub content_type: String,
    pub complexity_level: ComplexityLevel,
    pub title: Option<String>,
    pub source: Option<String>,
    pub summary: Option<String>,
    pub flashcards: Option<Vec<Flashcard>>,
    pub quiz: Option<Vec<QuizQuestion>>,
    pub mind_map: Option<MindMap>,
    pub learning_path: Option<LearningPath>,
    pub key_terms: Option<Vec<KeyTerm>>,
    pub additional_resources: Option<Vec<AdditionalResource>>,
    pub created_at: DateTime<Utc>,
}

impl LearningContent {
    pub fn new(id: u64, new: NewContent) -> Self {
        Self {
            id,
            original_content: new.original_content,
            content_type: new.content_type,
            complexity_level: new.complexity_level,
            title: new.title,
            source: new.source,
            summary: None,
            flashcards: None,
            quiz: None,
            mind_map: None,
            learning_path: None,
            key_terms: None,
            additional_resources: None,
            created_at: Utc::now(),
        }
    }

    pub fn attach(&mut self, materials: Materials) {
        self.summary = Some(materials.summary);
        self.flashcards = Some(materials.flashcards);
        self.quiz = Some(materials.quiz);
        self.mind_map = Some(materials.mind_map);
        self.learning_path = Some(materials.learning_path);
        self.key_terms = Some(materials.key_terms);
        self.additional_resources = Some(materials.additional_resources);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studykit_extract::ContentType;

    #[test]
    fn test_complexity_bounds() {
        assert!(ComplexityLevel::new(0).is_none());
        assert!(ComplexityLevel::new(6).is_none());
        assert!(ComplexityLevel::new(-1).is_none());
        assert_eq!(ComplexityLevel::new(1).map(|l| l.label()), Some("beginner"));
        assert_eq!(ComplexityLevel::new(5).map(|l| l.label()), Some("academic"));
        assert_eq!(ComplexityLevel::default().get(), 3);
    }

    #[test]
    fn test_complexity_serde() {
        let level: ComplexityLevel = serde_json::from_str("4").unwrap();
        assert_eq!(level.get(), 4);
        assert_eq!(serde_json::to_string(&level).unwrap(), "4");
        assert!(serde_json::from_str::<ComplexityLevel>("7").is_err());
    }

    #[test]
    fn test_quiz_question_shape() {
        let question: QuizQuestion = serde_json::from_str(
            r#"{"question": "2+2?", "options": ["1", "2", "3", "4"], "correctAnswer": 3}"#,
        )
        .unwrap();
        assert!(question.is_well_formed());
        assert_eq!(question.explanation, "");

        let bad = QuizQuestion {
            correct_answer: 4,
            ..question
        };
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let extracted = ExtractedContent::new(
            "Some text".into(),
            ContentType::YouTube {
                video_id: "abc".into(),
            },
            "https://youtu.be/abc",
        );
        let mut record = LearningContent::new(
            7,
            NewContent::from_extracted(&extracted, ComplexityLevel::default()),
        );
        record.attach(Materials {
            summary: "short".into(),
            flashcards: vec![],
            quiz: vec![],
            mind_map: MindMap::default(),
            learning_path: LearningPath::default(),
            key_terms: vec![],
            additional_resources: vec![],
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["contentType"], "youtube");
        assert_eq!(json["complexityLevel"], 3);
        assert_eq!(json["source"], "https://youtu.be/abc");
        assert_eq!(json["mindMap"]["centralTopic"], "Topic");
        assert_eq!(json["learningPath"]["prerequisiteTopics"], serde_json::json!([]));
        assert_eq!(json["keyTerms"], serde_json::json!([]));
        assert_eq!(json["additionalResources"], serde_json::json!([]));
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_unmaterialized_record_has_null_artifacts() {
        let extracted = ExtractedContent::new("Some text".into(), ContentType::Text, "text");
        let record = LearningContent::new(
            1,
            NewContent::from_extracted(&extracted, ComplexityLevel::default()),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["learningPath"].is_null());
        assert!(json["keyTerms"].is_null());
        assert!(json["additionalResources"].is_null());
    }

    #[test]
    fn test_learning_path_tolerates_partial_json() {
        let path: LearningPath = serde_json::from_str(
            r#"{"currentTopic": "Cell respiration",
                "recommendedSteps": [{"title": "Glycolysis", "difficulty": 2.5}]}"#,
        )
        .unwrap();
        assert_eq!(path.current_topic, "Cell respiration");
        assert!(path.next_topics.is_empty());
        assert_eq!(path.recommended_steps[0].difficulty, 2.5);
        assert_eq!(path.recommended_steps[0].completed, None);
        assert!(!path.is_empty());
        assert!(LearningPath::default().is_empty());
    }

    #[test]
    fn test_additional_resource_shape() {
        let resource: AdditionalResource = serde_json::from_str(
            r#"{"title": "Khan Academy: Photosynthesis", "type": "course",
                "url": "https://www.khanacademy.org/science/biology", "difficulty": 2}"#,
        )
        .unwrap();
        assert_eq!(resource.kind, ResourceKind::Course);
        assert!(resource.is_well_formed());

        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "course");
        assert!(json.get("rating").is_none());

        let podcast: AdditionalResource =
            serde_json::from_str(r#"{"title": "Podcast", "type": "podcast", "url": "ftp://x"}"#)
                .unwrap();
        assert_eq!(podcast.kind, ResourceKind::Other);
        assert!(!podcast.is_well_formed());
    }
}
