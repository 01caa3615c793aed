pub mod adjudicator;
pub mod collector;
pub mod error;
pub mod explorer;
pub mod github;
mod http;
pub mod model;
pub mod service;

pub use adjudicator::AiAdjudicator;
pub use collector::ContentCollector;
pub use error::{Result, ReviewError};
pub use explorer::{explorer_endpoint, ExplorerClient, ExplorerKeys, ExplorerSource};
pub use github::{GithubClient, GithubSource, PullRequestRef, DEFAULT_GITHUB_API_URL};
pub use model::{GeminiClient, LanguageModel, DEFAULT_GEMINI_API_URL};
pub use service::{AiReviewRequest, AiReviewService, AiReviewer};
