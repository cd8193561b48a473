//! Paged channel history synchronization.
//!
//! A run starts from one cursor and walks pages until every requested
//! direction returns an empty page. `Latest` walks both ways, `Before`
//! only backward, `After` only forward. Each page is parsed and written in
//! one transaction, so a failed run can be repeated from scratch.
//!
//! Continuation cursors come from the first and last element of each page,
//! which Discord returns newest-first.


use std::collections::VecDeque;
use std::future::Future;

use discord_client::api::{MAX_PAGE_SIZE, PageCursor};
use discord_client::snowflake::{self, SnowflakeError};
use discord_client::{Channel, DiscordApiClient, DiscordError, Message};
use score_db::channels::ChannelInfo;
use score_db::puzzles::Puzzle;
use score_db::scores::Score;
use score_db::{Database, DbError};
use tokio_util::sync::CancellationToken;

/// Where messages and channel metadata come from.
pub trait ChatSource: Send + Sync {
    /// One page of history, newest first, for a single cursor.
    fn fetch_page(
        &self,
        channel_id: &str,
        cursor: &PageCursor,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Message>, DiscordError>> + Send;

    fn fetch_channel(
        &self,
        channel_id: &str,
    ) -> impl Future<Output = Result<Channel, DiscordError>> + Send;
}

impl ChatSource for DiscordApiClient {
    async fn fetch_page(
        &self,
        channel_id: &str,
        cursor: &PageCursor,
        limit: u32,
    ) -> Result<Vec<Message>, DiscordError> {
        self.get_channel_messages(channel_id, cursor, limit).await
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<Channel, DiscordError> {
        self.get_channel(channel_id).await
    }
}

/// Run-level failure. Message-level problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Transport failure: {0}")]
    Transport(#[from] DiscordError),

    #[error("Store failure: {0}")]
    Store(#[from] DbError),

    #[error("Codec failure: {0}")]
    Codec(#[from] SnowflakeError),

    #[error("Sync cancelled")]
    Cancelled,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Pages requested, including the empty page that ends a direction.
    pub pages: usize,
    pub messages: usize,
    pub scores: usize,
    /// Messages that produced no score.
    pub skipped: usize,
}

impl SyncReport {
    pub fn merge(&mut self, other: SyncReport) {
        self.pages += other.pages;
        self.messages += other.messages;
        self.scores += other.scores;
        self.skipped += other.skipped;
    }
}

/// Puzzle row for the date a score was posted on.
pub fn puzzle_for(score: &Score) -> Result<Puzzle, SnowflakeError> {
    let date = snowflake::decode_str(&score.id)?;
    Ok(Puzzle {
        game: score.game.clone(),
        game_number: score.game_number.clone(),
        date: snowflake::format_date(date),
    })
}

/// Parse a page and build the rows to persist for it.
///
/// Scores whose id cannot be dated are dropped with the other
/// message-level failures.
pub fn page_rows(messages: &[Message]) -> (Vec<Score>, Vec<Puzzle>) {
    let parsed = puzzle_parser::parse_messages(messages);
    let mut scores = Vec::with_capacity(parsed.len());
    let mut puzzles = Vec::with_capacity(parsed.len());
    for score in parsed {
        match puzzle_for(&score) {
            Ok(puzzle) => {
                puzzles.push(puzzle);
                scores.push(score);
            }
            Err(e) => {
                tracing::warn!(message_id = %score.id, error = %e, "Score has an undatable id");
            }
        }
    }
    (scores, puzzles)
}

/// Drives history pages for one channel at a time.
pub struct ChannelSynchronizer<S> {
    source: S,
    db: Database,
    page_size: u32,
    cancel: CancellationToken,
}

impl<S: ChatSource> ChannelSynchronizer<S> {
    pub fn new(source: S, db: Database) -> Self {
        Self {
            source,
            db,
            page_size: MAX_PAGE_SIZE,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Stop scheduling pages once `token` is cancelled. A page that is
    /// already being persisted still commits.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Walk history from `start` until each requested direction is exhausted.
    pub async fn sync(&self, channel_id: &str, start: PageCursor) -> Result<SyncReport, SyncError> {
        let mut report = SyncReport::default();
        let mut queue = VecDeque::from([start]);

        while let Some(cursor) = queue.pop_front() {
            if self.cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            let messages = tokio::select! {
                _ = self.cancel.cancelled() => return Err(SyncError::Cancelled),
                page = self.source.fetch_page(channel_id, &cursor, self.page_size) => page?,
            };
            report.pages += 1;

            let (Some(newest), Some(oldest)) = (messages.first(), messages.last()) else {
                tracing::info!(channel_id, ?cursor, "No new records found");
                continue;
            };
            let newest = newest.id.clone();
            let oldest = oldest.id.clone();

            let (scores, puzzles) = page_rows(&messages);
            self.db.persist_page(&scores, &puzzles)?;

            report.messages += messages.len();
            report.scores += scores.len();
            report.skipped += messages.len() - scores.len();
            tracing::info!(
                channel_id,
                scores = scores.len(),
                "{} records updated ({newest} - {oldest})",
                messages.len()
            );

            match cursor {
                PageCursor::Latest => {
                    queue.push_back(PageCursor::Before(oldest));
                    queue.push_back(PageCursor::After(newest));
                }
                PageCursor::Before(previous) => {
                    push_unless_stalled(&mut queue, &previous, PageCursor::Before(oldest));
                }
                PageCursor::After(previous) => {
                    push_unless_stalled(&mut queue, &previous, PageCursor::After(newest));
                }
            }
        }

        Ok(report)
    }

    /// Catch up from the stored extremes: backward from the oldest known
    /// score and forward from the newest. A channel with no scores gets a
    /// full scan.
    pub async fn sync_incremental(&self, channel_id: &str) -> Result<SyncReport, SyncError> {
        match self.db.score_id_range(channel_id)? {
            Some((oldest, newest)) => {
                tracing::debug!(channel_id, %oldest, %newest, "Incremental sync");
                let mut report = self.sync(channel_id, PageCursor::Before(oldest)).await?;
                report.merge(self.sync(channel_id, PageCursor::After(newest)).await?);
                Ok(report)
            }
            None => {
                tracing::debug!(channel_id, "No stored scores, full sync");
                self.sync(channel_id, PageCursor::Latest).await
            }
        }
    }

    /// Cached channel metadata, fetched and stored on first use.
    pub async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelInfo, SyncError> {
        if let Some(info) = self.db.get_channel(channel_id)? {
            return Ok(info);
        }
        let channel = self.source.fetch_channel(channel_id).await?;
        let info = ChannelInfo {
            channel_id: channel.id,
            guild_id: channel.guild_id.unwrap_or_default(),
            name: channel.name.unwrap_or_default(),
        };
        self.db.upsert_channel(&info)?;
        tracing::info!(channel_id, guild_id = %info.guild_id, name = %info.name, "Cached channel info");
        Ok(info)
    }
}

/// A page whose edge equals the cursor that produced it would repeat forever.
fn push_unless_stalled(queue: &mut VecDeque<PageCursor>, previous: &str, next: PageCursor) {
    let next_id = match &next {
        PageCursor::Before(id) | PageCursor::After(id) => id.as_str(),
        PageCursor::Latest => "",
    };
    if next_id == previous {
        tracing::warn!(cursor = previous, "Page did not advance, stopping this direction");
        return;
    }
    queue.push_back(next);
}
