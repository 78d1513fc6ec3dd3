//! # StudyKit Server
//!
//! HTTP API over the extraction pipeline. Each request turns pasted text, an
//! article link, a YouTube link or an uploaded text file into one stored
//! record with a summary, flashcards, a quiz, a mind map, a learning path, key
//! terms and links to further resources.
//!
//! | Method | Path                  | Body                               |
//! |--------|-----------------------|------------------------------------|
//! | POST   | `/api/process-content`| `{"content", "complexityLevel"?}`  |
//! | POST   | `/api/upload-file`    | multipart `file`, `complexityLevel`?|
//! | GET    | `/api/content/:id`    |                                    |
//! | GET    | `/health`             |                                    |

pub mod app;
pub mod config;
pub mod error;
pub mod generate;
pub mod handlers;
pub mod model;
pub mod store;

pub use app::{router, AppState};
pub use config::{ConfigError, ServerConfig};
pub use error::{AppError, Result};
pub use generate::{ChatGenerator, GenerateError, LlmConfig, MaterialGenerator};
pub use model::{
    AdditionalResource, ComplexityLevel, Flashcard, KeyTerm, LearningContent, LearningPath,
    LearningStep, Materials, MindMap, MindMapBranch, NewContent, QuizQuestion, ResourceKind,
};
pub use store::{ContentStore, MemStore};
