//! User-facing notices (toasts) published to whichever front end listens.
//!
//! A [`NoticeBus`] is created explicitly and shared by cloning the handle.
//! Subscribers receive the full visible list through a `watch` channel on
//! every change. Dismissed notices linger for `remove_delay` so a front end
//! can animate them out, then a timer task removes them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_LIMIT: usize = 1;
pub const DEFAULT_REMOVE_DELAY: Duration = Duration::from_secs(5);

pub type NoticeId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: NoticeId,
    pub level: NoticeLevel,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub open: bool,
}

/// Content for a new notice; the bus assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNotice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
}

impl NewNotice {
    pub fn new(level: NoticeLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticePatch {
    pub level: Option<NoticeLevel>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeBusConfig {
    pub limit: usize,
    pub remove_delay: Duration,
}

impl Default for NoticeBusConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            remove_delay: DEFAULT_REMOVE_DELAY,
        }
    }
}

#[derive(Clone)]
pub struct NoticeBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    config: NoticeBusConfig,
    state: Mutex<BusState>,
}

struct BusState {
    notices: Vec<Notice>,
    next_id: NoticeId,
    timers: HashMap<NoticeId, JoinHandle<()>>,
    tx: Option<watch::Sender<Vec<Notice>>>,
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new(NoticeBusConfig::default())
    }
}

impl std::fmt::Debug for NoticeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoticeBus")
            .field("config", &self.inner.config)
            .field("visible", &self.notices().len())
            .finish()
    }
}

impl NoticeBus {
    pub fn new(config: NoticeBusConfig) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(BusInner {
                config: NoticeBusConfig {
                    limit: config.limit.max(1),
                    ..config
                },
                state: Mutex::new(BusState {
                    notices: Vec::new(),
                    next_id: 1,
                    timers: HashMap::new(),
                    tx: Some(tx),
                }),
            }),
        }
    }

    /// Receiver of the visible notices, newest first. After
    /// [`shutdown`](Self::shutdown) the receiver is already closed.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notice>> {
        match &self.lock().tx {
            Some(tx) => tx.subscribe(),
            None => watch::channel(Vec::new()).1,
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.lock().notices.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().tx.is_none()
    }

    /// Shows a notice, evicting the oldest beyond the limit. Notices pushed
    /// after shutdown are dropped.
    pub fn push(&self, notice: NewNotice) -> NoticeId {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        if state.tx.is_none() {
            return id;
        }
        state.notices.insert(
            0,
            Notice {
                id,
                level: notice.level,
                title: notice.title,
                description: notice.description,
                open: true,
            },
        );
        let keep = state.notices.len().min(self.inner.config.limit);
        let evicted = state.notices.split_off(keep);
        for notice in evicted {
            if let Some(timer) = state.timers.remove(&notice.id) {
                timer.abort();
            }
        }
        publish(&state);
        id
    }

    /// Returns false when the notice is no longer visible.
    pub fn update(&self, id: NoticeId, patch: NoticePatch) -> bool {
        let mut state = self.lock();
        let Some(notice) = state.notices.iter_mut().find(|notice| notice.id == id) else {
            return false;
        };
        if let Some(level) = patch.level {
            notice.level = level;
        }
        if let Some(title) = patch.title {
            notice.title = title;
        }
        if let Some(description) = patch.description {
            notice.description = description;
        }
        publish(&state);
        true
    }

    /// Closes a notice and schedules its removal.
    pub fn dismiss(&self, id: NoticeId) {
        let mut state = self.lock();
        let found = match state.notices.iter_mut().find(|notice| notice.id == id) {
            Some(notice) => {
                notice.open = false;
                true
            }
            None => false,
        };
        if found {
            self.schedule_removal(&mut state, id);
            publish(&state);
        }
    }

    pub fn dismiss_all(&self) {
        let mut state = self.lock();
        let ids: Vec<NoticeId> = state
            .notices
            .iter_mut()
            .map(|notice| {
                notice.open = false;
                notice.id
            })
            .collect();
        for id in ids {
            self.schedule_removal(&mut state, id);
        }
        publish(&state);
    }

    /// Removes a notice immediately, cancelling any pending timer.
    pub fn remove(&self, id: NoticeId) {
        let mut state = self.lock();
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
        let before = state.notices.len();
        state.notices.retain(|notice| notice.id != id);
        if state.notices.len() != before {
            publish(&state);
        }
    }

    /// Cancels pending timers, clears the list and closes every receiver.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.notices.clear();
        if let Some(tx) = state.tx.take() {
            tx.send_replace(Vec::new());
        }
        debug!("notice bus shut down");
    }

    fn schedule_removal(&self, state: &mut BusState, id: NoticeId) {
        if state.timers.contains_key(&id) {
            return;
        }
        // Without a runtime there is nothing to defer onto.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            state.notices.retain(|notice| notice.id != id);
            return;
        };
        let delay = self.inner.config.remove_delay;
        let weak: Weak<BusInner> = Arc::downgrade(&self.inner);
        let timer = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                NoticeBus { inner }.expire(id);
            }
        });
        state.timers.insert(id, timer);
    }

    fn expire(&self, id: NoticeId) {
        let mut state = self.lock();
        state.timers.remove(&id);
        let before = state.notices.len();
        state.notices.retain(|notice| notice.id != id);
        if state.notices.len() != before {
            publish(&state);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn publish(state: &BusState) {
    if let Some(tx) = &state.tx {
        tx.send_replace(state.notices.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_first_and_limited() {
        let bus = NoticeBus::new(NoticeBusConfig {
            limit: 2,
            ..Default::default()
        });
        let first = bus.push(NewNotice::info("one"));
        let second = bus.push(NewNotice::info("two"));
        let third = bus.push(NewNotice::info("three"));
        let ids: Vec<_> = bus.notices().iter().map(|notice| notice.id).collect();
        assert_eq!(ids, vec![third, second]);
        assert!(!ids.contains(&first));
    }

    #[test]
    fn update_patches_only_given_fields() {
        let bus = NoticeBus::default();
        let id = bus.push(NewNotice::info("Saving").with_description("please wait"));
        assert!(bus.update(
            id,
            NoticePatch {
                level: Some(NoticeLevel::Success),
                ..Default::default()
            }
        ));
        let notice = &bus.notices()[0];
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(notice.title, "Saving");
        assert_eq!(notice.description.as_deref(), Some("please wait"));
        assert!(!bus.update(id + 1, NoticePatch::default()));
    }

    #[test]
    fn dismiss_without_runtime_removes_immediately() {
        let bus = NoticeBus::default();
        let id = bus.push(NewNotice::warning("gone soon"));
        bus.dismiss(id);
        assert!(bus.notices().is_empty());
    }
}
