//! Assistant chat widget state: a bounded, append-only transcript.
//!
//! A send is two-phase. `begin` appends the user's message straight away and
//! hands back the capped transcript to post; `confirm` or `fail` settles it
//! once the backend answers. Closing the widget wipes the transcript and
//! bumps a generation counter, so an answer that lands after the close is
//! dropped instead of reviving the old conversation.

use crate::api::{ApiError, Backend};
use crate::models::ChatMessage;
use std::collections::VecDeque;
use std::future::Future;
use tracing::{debug, warn};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Open,
}

/// An exchange whose user message is already in the transcript and whose
/// reply is still outstanding.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    generation: u64,
    /// Transcript snapshot to post to `/bot`.
    pub outgoing: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// Blank input or closed widget; nothing was sent.
    Ignored,
    /// Reply appended.
    Confirmed,
    /// Backend answered without text; only the user message remains.
    NoReply,
    /// Request failed; the user message stays visible.
    Failed(String),
    /// The widget was closed while the request was in flight.
    Stale,
    /// The user gave up waiting; the conversation was closed.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Transcript {
    messages: VecDeque<ChatMessage>,
    limit: usize,
    state: WidgetState,
    generation: u64,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl Transcript {
    pub fn new(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit + 1),
            limit: limit.max(1),
            state: WidgetState::Closed,
            generation: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == WidgetState::Open
    }

    pub fn open(&mut self) {
        self.state = WidgetState::Open;
    }

    /// Closing is destructive: the conversation is gone and any pending
    /// exchange becomes stale.
    pub fn close(&mut self) {
        self.state = WidgetState::Closed;
        self.messages.clear();
        self.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    /// Append and evict from the front until within the limit.
    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push_back(message);
        while self.messages.len() > self.limit {
            self.messages.pop_front();
        }
    }

    /// Phase one: record the user's message and snapshot what to send.
    pub fn begin(&mut self, text: &str) -> Option<PendingExchange> {
        let text = text.trim();
        if text.is_empty() || !self.is_open() {
            return None;
        }
        self.append(ChatMessage::user(text));
        Some(PendingExchange {
            generation: self.generation,
            outgoing: self.messages.iter().cloned().collect(),
        })
    }

    /// Phase two, success.
    pub fn confirm(&mut self, pending: PendingExchange, reply: Option<String>) -> ExchangeOutcome {
        if pending.generation != self.generation {
            debug!("Dropping reply for a closed conversation");
            return ExchangeOutcome::Stale;
        }
        match reply {
            Some(text) => {
                self.append(ChatMessage::bot(text));
                ExchangeOutcome::Confirmed
            }
            None => ExchangeOutcome::NoReply,
        }
    }

    /// Phase two, failure. The user's message is left in place.
    pub fn fail(&mut self, pending: PendingExchange, error: &ApiError) -> ExchangeOutcome {
        if pending.generation != self.generation {
            return ExchangeOutcome::Stale;
        }
        warn!("Chat request failed: {}", error);
        ExchangeOutcome::Failed(error.to_string())
    }
}

/// One full round trip against the backend. If `cancel` completes first the
/// request is dropped and the widget closes.
pub async fn send<B, C>(transcript: &mut Transcript, backend: &B, text: &str, cancel: C) -> ExchangeOutcome
where
    B: Backend + ?Sized,
    C: Future,
{
    let Some(pending) = transcript.begin(text) else {
        return ExchangeOutcome::Ignored;
    };

    let reply = tokio::select! {
        biased;
        _ = cancel => {
            transcript.close();
            return ExchangeOutcome::Cancelled;
        }
        r = backend.chat(&pending.outgoing) => r,
    };
    match reply {
        Ok(reply) => transcript.confirm(pending, reply),
        Err(e) => transcript.fail(pending, &e),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
