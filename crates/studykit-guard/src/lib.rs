//! # StudyKit Guard
//!
//! Sanitization and admission layer for text that is about to be handed to a
//! language model.
//!
//! Everything that reaches the generation layer passes through here:
//!
//! - **Markup stripping**: HTML is parsed and only text nodes survive. Script,
//!   embed and form elements are dropped together with their content.
//! - **Residual cleanup**: a regex backstop removes script blocks, `javascript:`
//!   protocols, inline handlers and encoded tag fragments that malformed markup
//!   can smuggle past the parser.
//! - **Length check**: empty or over-long text is rejected.
//! - **Security check**: any dangerous pattern still present after
//!   sanitization is a hard stop, not another stripping pass.
//! - **Audit**: every admission decision is logged with a content hash.
//!
//! ## Quick Start
//!
//! ```rust
//! use studykit_guard::{Guard, GuardConfig};
//!
//! let guard = Guard::new(GuardConfig::default());
//!
//! let clean = guard.sanitize("<script>alert(1)</script>hello");
//! assert_eq!(clean, "hello");
//!
//! let admitted = guard.admit("<p>Photosynthesis turns light into sugar.</p>").unwrap();
//! assert_eq!(admitted, "Photosynthesis turns light into sugar.");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  Extracted  │ ──► │  Sanitizer   │ ──► │ Length check │ ──► │  Security   │ ──► LLM
//! │    text     │     │ (parse+regex)│     │  (≤ 20,000)  │     │    scan     │
//! └─────────────┘     └──────────────┘     └──────────────┘     └─────────────┘
//!                                                                      │
//!                                                               ┌─────────────┐
//!                                                               │ Audit logger│
//!                                                               └─────────────┘
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod guard;
pub mod markup;
pub mod security;
pub mod types;
pub mod validate;

pub use config::GuardConfig;
pub use error::{group_thousands, GuardError, Result, ValidationFailure};
pub use guard::{Guard, GuardBuilder};
pub use markup::Sanitizer;
pub use security::SecurityScanner;
pub use types::*;
pub use validate::{validate_length, DEFAULT_MAX_CHARS};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::GuardConfig;
    pub use crate::error::{GuardError, Result, ValidationFailure};
    pub use crate::guard::Guard;
    pub use crate::types::*;
}
