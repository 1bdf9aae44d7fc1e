use async_trait::async_trait;
use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use quiz_core::model::{Difficulty, Question};

use super::QuestionProvider;
use super::decode::decode_entities;
use crate::error::ProviderError;

pub const OPEN_TRIVIA_BASE_URL: &str = "https://opentdb.com";

/// Remote provider backed by the Open Trivia DB HTTP API.
#[derive(Clone)]
pub struct OpenTriviaProvider {
    client: Client,
    base_url: String,
}

impl Default for OpenTriviaProvider {
    fn default() -> Self {
        Self::new(OPEN_TRIVIA_BASE_URL)
    }
}

impl OpenTriviaProvider {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl QuestionProvider for OpenTriviaProvider {
    async fn fetch(
        &self,
        count: u32,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, ProviderError> {
        if count == 0 {
            return Err(ProviderError::InvalidCount);
        }

        let url = format!("{}/api.php", self.base_url.trim_end_matches('/'));
        debug!(%url, count, %difficulty, "requesting questions");
        let response = self
            .client
            .get(url)
            .query(&[
                ("amount", count.to_string()),
                ("difficulty", difficulty.as_str().to_owned()),
                ("type", "multiple".to_owned()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }

        let body: TriviaResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let questions = into_questions(body, &mut rng())?;
        info!(count = questions.len(), %difficulty, "fetched remote questions");
        Ok(questions)
    }
}

#[derive(Debug, Deserialize)]
struct TriviaResponse {
    response_code: i64,
    #[serde(default)]
    results: Vec<TriviaQuestion>,
}

#[derive(Debug, Deserialize)]
struct TriviaQuestion {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

/// Decode and validate an API payload, shuffling question order and each
/// question's options.
fn into_questions<R: Rng + ?Sized>(
    body: TriviaResponse,
    rng: &mut R,
) -> Result<Vec<Question>, ProviderError> {
    if body.response_code != 0 {
        return Err(ProviderError::ResponseCode(body.response_code));
    }
    if body.results.is_empty() {
        return Err(ProviderError::NoQuestionsAvailable);
    }

    let mut questions = body
        .results
        .into_iter()
        .map(|raw| {
            let correct = decode_entities(&raw.correct_answer);
            let mut options: Vec<String> = raw
                .incorrect_answers
                .iter()
                .map(|a| decode_entities(a))
                .collect();
            options.push(correct.clone());
            options.shuffle(rng);
            Question::new(decode_entities(&raw.question), options, correct)
                .map_err(|e| ProviderError::Malformed(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    questions.shuffle(rng);
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TriviaResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn decodes_and_keeps_correct_answer_among_options() {
        let body = parse(
            r#"{
                "response_code": 0,
                "results": [{
                    "type": "multiple",
                    "difficulty": "medium",
                    "category": "Art",
                    "question": "Who painted &quot;The Scream&quot;?",
                    "correct_answer": "Edvard Munch",
                    "incorrect_answers": ["Claude Monet", "Salvador Dal&iacute;", "Frida Kahlo"]
                }]
            }"#,
        );

        let questions = into_questions(body, &mut rng()).unwrap();
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.text(), "Who painted \"The Scream\"?");
        assert_eq!(q.options().len(), 4);
        assert!(q.options().iter().any(|o| o == "Salvador Dalí"));
        assert!(q.correct_index().is_some_and(|i| q.is_correct(i)));
    }

    #[test]
    fn every_fetched_question_is_kept_when_order_is_shuffled() {
        let body = parse(
            r#"{"response_code": 0, "results": [
                {"question": "Q1", "correct_answer": "A", "incorrect_answers": ["B", "C"]},
                {"question": "Q2", "correct_answer": "D", "incorrect_answers": ["E", "F"]},
                {"question": "Q3", "correct_answer": "G", "incorrect_answers": ["H", "I"]}
            ]}"#,
        );

        let questions = into_questions(body, &mut rng()).unwrap();
        let mut texts: Vec<&str> = questions.iter().map(Question::text).collect();
        texts.sort_unstable();
        assert_eq!(texts, ["Q1", "Q2", "Q3"]);
    }

    #[test]
    fn non_zero_response_code_is_an_error() {
        let body = parse(r#"{"response_code": 1, "results": []}"#);
        assert!(matches!(
            into_questions(body, &mut rng()),
            Err(ProviderError::ResponseCode(1))
        ));
    }

    #[test]
    fn duplicate_options_are_malformed() {
        let body = parse(
            r#"{"response_code": 0, "results": [{
                "question": "Q", "correct_answer": "A", "incorrect_answers": ["A", "B"]
            }]}"#,
        );
        assert!(matches!(
            into_questions(body, &mut rng()),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_fails_with_http_error() {
        let provider = OpenTriviaProvider::new("http://127.0.0.1:9");
        assert!(matches!(
            provider.fetch(5, Difficulty::Easy).await,
            Err(ProviderError::Http(_))
        ));
    }
}
