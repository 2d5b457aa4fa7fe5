//! Append-only, process-lifetime conversation log.
//!
//! Turn ids are not a plain counter: the k-th user turn gets `2k+1` and the
//! k-th assistant turn gets `2k`, so serial rounds produce 1,0,3,2,5,4,...
//! Existing clients order history by these ids.
//!
//! ```rust
//! use lchat::{ConversationLog, InMemoryConversationLog, TurnDraft};
//!
//! let log = InMemoryConversationLog::new();
//! let user = log.append(TurnDraft::user("hi", None, false));
//! let bot = log.append(TurnDraft::assistant("hello"));
//! assert_eq!((user.id, bot.id), (1, 0));
//! ```

use std::sync::{Arc, PoisonError, RwLock};

use lcommon::{Clock, SystemClock};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot")]
    Assistant,
}

/// One stored message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub id: u64,
    #[serde(rename = "type")]
    pub role: TurnRole,
    pub content: String,
    #[serde(rename = "timestamp")]
    pub created_at: String,
    #[serde(rename = "hasScreenshot")]
    pub has_attachment: bool,
}

/// Fields supplied by the caller of [`ConversationLog::append`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnDraft {
    pub role: TurnRole,
    pub content: String,
    pub created_at: Option<String>,
    pub has_attachment: bool,
}

impl TurnDraft {
    pub fn user(content: impl Into<String>, created_at: Option<String>, has_attachment: bool) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            created_at,
            has_attachment,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            created_at: None,
            has_attachment: false,
        }
    }
}

pub trait ConversationLog: Send + Sync + std::fmt::Debug {
    fn append(&self, draft: TurnDraft) -> ChatTurn;

    /// The last `limit` turns, oldest first. `0` yields nothing.
    fn recent(&self, limit: usize) -> Vec<ChatTurn>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
struct LogState {
    turns: Vec<ChatTurn>,
    user_turns: u64,
    assistant_turns: u64,
}

impl LogState {
    fn next_id(&mut self, role: TurnRole) -> u64 {
        match role {
            TurnRole::User => {
                let id = 2 * self.user_turns + 1;
                self.user_turns += 1;
                id
            }
            TurnRole::Assistant => {
                let id = 2 * self.assistant_turns;
                self.assistant_turns += 1;
                id
            }
        }
    }
}

#[derive(Debug)]
pub struct InMemoryConversationLog {
    state: RwLock<LogState>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryConversationLog {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl InMemoryConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(LogState::default()),
            clock,
        }
    }
}

impl ConversationLog for InMemoryConversationLog {
    fn append(&self, draft: TurnDraft) -> ChatTurn {
        let created_at = draft
            .created_at
            .unwrap_or_else(|| self.clock.now_rfc3339());

        // A panic elsewhere cannot leave a half-written turn, so a poisoned lock is still usable.
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let turn = ChatTurn {
            id: state.next_id(draft.role),
            role: draft.role,
            content: draft.content,
            created_at,
            has_attachment: draft.has_attachment,
        };

        state.turns.push(turn.clone());
        turn
    }

    fn recent(&self, limit: usize) -> Vec<ChatTurn> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let start = state.turns.len().saturating_sub(limit);
        state.turns[start..].to_vec()
    }

    fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .turns
            .len()
    }
}
