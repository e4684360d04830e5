use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::extract::{ExtractedTransaction, Extractor};
use crate::models::{CandidateMessage, ExpenseError, TransactionDraft};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const GENERATE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROMPT_TEMPLATE: &str = "\
You are an expense extraction assistant working for user {user_id}.
Each numbered item below is the plain-text body of one expense email,
prefixed with its message id in square brackets.

{enumerated_transactions}

For every item return one JSON object with the fields: message_id (the id
given for the item), title, date (YYYY-MM-DD), amount (decimal string),
description (at most 50 characters, optional) and status (true when the
expense is settled). Return a JSON array with exactly one object per item
and nothing else.";

/// Schema-constrained extraction over the Gemini generate API.
pub struct GeminiExtractor {
    http: Client,
    api_key: String,
    model_name: String,
    base_url: String
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String
}

/// Wire shape the model is asked to produce for each candidate.
#[derive(Debug, Deserialize)]
pub(crate) struct ExtractedRow {
    pub(crate) message_id: String,
    #[serde(flatten)]
    pub(crate) draft: TransactionDraft
}

impl GeminiExtractor {
    pub fn new(http: Client, api_key: impl Into<String>, model_name: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            model_name: model_name.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: GENERATE_BASE_URL.to_string()
        }
    }
}

#[async_trait]
impl Extractor for GeminiExtractor {
    async fn extract(&self, user_id: &str, candidates: &[CandidateMessage]) -> Result<Vec<ExtractedTransaction>, ExpenseError> {
        let prompt = render_prompt(user_id, candidates);
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model_name);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": response_schema()
                }
            }))
            .send()
            .await
            .map_err(|error| ExpenseError::upstream("extractor", error))?;

        if !response.status().is_success() {
            return Err(ExpenseError::upstream(
                "extractor",
                format!("generate call returned status {}", response.status())
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|error| ExpenseError::upstream("extractor", error))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(|content| content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or_else(|| ExpenseError::validation("extractor response carried no content"))?;

        parse_rows(text)
    }
}

/// Renders the single structured prompt enumerating each candidate body.
pub(crate) fn render_prompt(user_id: &str, candidates: &[CandidateMessage]) -> String {
    let enumerated: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| format!("{}. [{}] {}", index + 1, candidate.id, candidate.body))
        .collect();

    PROMPT_TEMPLATE
        .replace("{enumerated_transactions}", &enumerated.join("\n"))
        .replace("{user_id}", user_id)
}

/// Strict schema validation of the model response: a malformed batch is a
/// hard failure with no partial acceptance.
pub(crate) fn parse_rows(text: &str) -> Result<Vec<ExtractedTransaction>, ExpenseError> {
    let rows: Vec<ExtractedRow> = serde_json::from_str(text)
        .map_err(|error| ExpenseError::validation(format!("extractor returned a malformed batch: {error}")))?;

    let mut extracted = Vec::with_capacity(rows.len());

    for row in rows {
        if row.message_id.is_empty() {
            return Err(ExpenseError::validation("extractor returned a row without a message id"));
        }

        row.draft.validate()?;

        extracted.push(ExtractedTransaction {
            message_id: row.message_id,
            draft: row.draft
        });
    }

    Ok(extracted)
}

fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "message_id": { "type": "STRING" },
                "title": { "type": "STRING" },
                "date": { "type": "STRING" },
                "amount": { "type": "STRING" },
                "description": { "type": "STRING" },
                "status": { "type": "BOOLEAN" }
            },
            "required": ["message_id", "title", "date", "amount", "status"]
        }
    })
}
