//! Scripted in-memory backend for tests.
//!
//! Replies are chosen by the first rule whose pattern occurs in the query
//! text; unmatched queries return an empty result. The backend records
//! every submitted query and counts sessions opened and closed.

use crate::backend::{Backend, Session};
use async_trait::async_trait;
use gremview_core::{Endpoint, Error, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// What a session answers for a matching query.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Return these items.
    Items(Vec<Value>),
    /// Return these items after a delay.
    Delayed(Duration, Vec<Value>),
    /// Fail with an execution error.
    Fail {
        /// Status code to report.
        code: Option<u16>,
        /// Error message.
        message: String,
    },
}

impl MockReply {
    /// Reply with items.
    pub fn items(items: Vec<Value>) -> Self {
        Self::Items(items)
    }

    /// Reply with items after `delay`.
    pub fn delayed(delay: Duration, items: Vec<Value>) -> Self {
        Self::Delayed(delay, items)
    }

    /// Reply with a script error.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail {
            code: Some(597),
            message: message.into(),
        }
    }
}

#[derive(Default)]
struct Inner {
    rules: Mutex<Vec<(String, MockReply)>>,
    refuse: Mutex<Option<String>>,
    queries: Mutex<Vec<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    close_notify: Notify,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// MockBackend
// ============================================================================

/// Scripted backend; clones share state.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Inner>,
}

impl MockBackend {
    /// Creates a backend that answers every query with an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule: queries containing `pattern` get `reply`.
    pub fn on(self, pattern: impl Into<String>, reply: MockReply) -> Self {
        lock(&self.inner.rules).push((pattern.into(), reply));
        self
    }

    /// Makes every `open` fail with a connection error.
    pub fn refuse_connections(self, message: impl Into<String>) -> Self {
        *lock(&self.inner.refuse) = Some(message.into());
        self
    }

    /// Queries submitted so far, in order.
    pub fn queries(&self) -> Vec<String> {
        lock(&self.inner.queries).clone()
    }

    /// Queries submitted so far that contain `pattern`.
    pub fn queries_matching(&self, pattern: &str) -> Vec<String> {
        self.queries()
            .into_iter()
            .filter(|q| q.contains(pattern))
            .collect()
    }

    /// Sessions opened so far.
    pub fn sessions_opened(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed so far.
    pub fn sessions_closed(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` sessions have been closed.
    pub async fn wait_for_closed(&self, count: usize) {
        loop {
            let notified = self.inner.close_notify.notified();
            if self.sessions_closed() >= count {
                return;
            }
            notified.await;
        }
    }

    fn reply_for(&self, query: &str) -> MockReply {
        lock(&self.inner.rules)
            .iter()
            .find(|(pattern, _)| query.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or(MockReply::Items(Vec::new()))
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn open(&self, endpoint: &Endpoint) -> Result<Box<dyn Session>> {
        if let Some(message) = lock(&self.inner.refuse).clone() {
            return Err(Error::connection(endpoint.to_string(), message));
        }
        self.inner.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            backend: self.clone(),
            closed: false,
        }))
    }
}

// ============================================================================
// MockSession
// ============================================================================

struct MockSession {
    backend: MockBackend,
    closed: bool,
}

#[async_trait]
impl Session for MockSession {
    async fn submit(&mut self, query: &str) -> Result<Vec<Value>> {
        if self.closed {
            return Err(Error::connection("mock", "session is closed"));
        }
        lock(&self.backend.inner.queries).push(query.to_string());
        match self.backend.reply_for(query) {
            MockReply::Items(items) => Ok(items),
            MockReply::Delayed(delay, items) => {
                tokio::time::sleep(delay).await;
                Ok(items)
            }
            MockReply::Fail { code, message } => Err(Error::execution(code, message)),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.backend.inner.closed.fetch_add(1, Ordering::SeqCst);
            self.backend.inner.close_notify.notify_waiters();
        }
        Ok(())
    }
}
