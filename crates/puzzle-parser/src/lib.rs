//! Score extraction from shared word-game results.
//!
//! Games: Wordle, Dordle, Octordle, Connections, Tradle, Strands, Animal.
//!
//! [`classifier`] finds which game a message announces, [`extractor`]
//! turns the match into a normalised score for that game's family.

pub mod classifier;
pub mod extractor;

pub use classifier::{Classification, GameFamily, classify};
pub use extractor::ParsedScore;

use discord_client::Message;
use score_db::scores::Score;

/// Message-level parse failure. None of these abort a page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("message type {kind} is not a score")]
    NotAScore { kind: i64 },

    #[error("message content is blank")]
    BlankContent,

    #[error("message did not parse: {0:?}")]
    ClassificationMiss(String),

    #[error("{game}: {detail}")]
    ExtractionInconsistency { game: String, detail: String },
}

/// Classify and extract a score from raw message text.
pub fn parse_content(content: &str) -> Result<ParsedScore, ParseError> {
    if content.trim().is_empty() {
        return Err(ParseError::BlankContent);
    }
    let classification =
        classify(content).ok_or_else(|| ParseError::ClassificationMiss(content.to_string()))?;
    classification.family.extract(&classification, content)
}

/// Parse a chat message into a score row keyed by the message id.
pub fn parse_message(message: &Message) -> Result<Score, ParseError> {
    if !message.is_ordinary() {
        return Err(ParseError::NotAScore { kind: message.kind });
    }
    let parsed = parse_content(&message.content)?;
    Ok(parsed.into_score(
        message.id.clone(),
        message.channel_id.clone(),
        message.author.username.clone(),
    ))
}

/// Parse a page of messages, logging and skipping the ones that fail.
pub fn parse_messages(messages: &[Message]) -> Vec<Score> {
    let mut scores = Vec::with_capacity(messages.len());
    for message in messages {
        match parse_message(message) {
            Ok(score) => scores.push(score),
            Err(e @ ParseError::ExtractionInconsistency { .. }) => {
                tracing::warn!(message_id = %message.id, error = %e, "Score extraction failed");
            }
            Err(e) => {
                tracing::debug!(message_id = %message.id, error = %e, "Message skipped");
            }
        }
    }
    scores
}

#[cfg(test)]
mod tests;
