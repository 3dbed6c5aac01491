// In-memory status board shared with the HTTP handlers
use crate::application::presenter::StatusView;
use crate::application::status_sink::{Notice, NoticeLevel, StatusSink};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

const MAX_NOTICES: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct PostedNotice {
    #[serde(flatten)]
    pub notice: Notice,
    pub posted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    #[serde(flatten)]
    pub view: StatusView,
    pub updated_at: Option<DateTime<Utc>>,
    /// Most recent first.
    pub notices: Vec<PostedNotice>,
}

#[derive(Debug)]
struct BoardState {
    view: StatusView,
    updated_at: Option<DateTime<Utc>>,
    notices: VecDeque<PostedNotice>,
}

#[derive(Debug, Clone)]
pub struct StatusBoard {
    state: Arc<RwLock<BoardState>>,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBoard {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(BoardState {
                view: StatusView::initial(),
                updated_at: None,
                notices: VecDeque::with_capacity(MAX_NOTICES),
            })),
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let state = self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        StatusSnapshot {
            view: state.view.clone(),
            updated_at: state.updated_at,
            notices: state.notices.iter().cloned().collect(),
        }
    }
}

impl StatusSink for StatusBoard {
    fn show_status(&self, view: &StatusView) {
        tracing::debug!("Status text {:?} (visible: {}, band: {:?})", view.text, view.visible, view.band);
        let mut state = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.view = view.clone();
        state.updated_at = Some(Utc::now());
    }

    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => tracing::info!("Notice: {}", notice.message),
            NoticeLevel::Warning => tracing::warn!("Notice: {}", notice.message),
            NoticeLevel::Error => tracing::error!("Notice: {}", notice.message),
        }

        let mut state = self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.notices.len() == MAX_NOTICES {
            state.notices.pop_back();
        }
        state.notices.push_front(PostedNotice {
            notice,
            posted_at: Utc::now(),
        });
    }
}
