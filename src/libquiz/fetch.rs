use log::debug;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::libquiz::question::Question;

pub const DEFAULT_AMOUNT: u32 = 10;
pub const DEFAULT_CATEGORY: u32 = 18;
pub const DEFAULT_DIFFICULTY: &str = "medium";

const API_BASE: &str = "https://opentdb.com/api.php";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("the trivia server is busy, try again in a minute")]
    RateLimited,
    #[error("trivia request failed with status {0}")]
    HttpStatus(StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("the trivia server returned no questions")]
    EmptyPayload,
    #[error("the trivia payload was malformed: {0}")]
    Malformed(String),
}

/// Where a question batch comes from. The controller issues at most one
/// fetch per session, so implementations need no retry logic.
pub trait QuestionSource {
    async fn fetch(&self) -> Result<Vec<Question>, FetchError>;
}

pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(amount: u32, category: u32, difficulty: &str) -> Self {
        let url = format!(
            "{API_BASE}?amount={amount}&category={category}&difficulty={difficulty}&type=multiple"
        );
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl QuestionSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Question>, FetchError> {
        debug!("[Fetch] GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }
        let payload: ApiResponse = response.json().await?;
        debug!(
            "[Fetch] Response code {} with {} questions.",
            payload.response_code,
            payload.results.len()
        );
        validate(payload.results)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    response_code: u8,
    results: Vec<Question>,
}

/// The payload is untrusted; anything that does not amount to a usable
/// non-empty batch counts as a fetch failure.
fn validate(results: Vec<Question>) -> Result<Vec<Question>, FetchError> {
    if results.is_empty() {
        return Err(FetchError::EmptyPayload);
    }
    for question in &results {
        if question.text.is_empty()
            || question.correct_answer.is_empty()
            || question.incorrect_answers.is_empty()
            || question.incorrect_answers.iter().any(String::is_empty)
        {
            return Err(FetchError::Malformed(
                "question with blank fields".to_string(),
            ));
        }
    }
    Ok(results)
}
