//! Generic loading/ready/error state for any view that shows one fetched entity.
//!
//! A page is mounted for a key (an id, a query). Mounting again, with the same or a different
//! key, restarts from `Loading`. Requests are never cancelled; instead each mount gets a
//! [`Ticket`], and a result presented with an outdated ticket is dropped.

use crate::error::ClientError;
use log::debug;
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState<T> {
    Loading,
    Ready(T),
    Error(String),
}

impl<T> PageState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            PageState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PageState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Proof of which mount a fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct Page<K, T> {
    key: Option<K>,
    generation: u64,
    state: PageState<T>,
}

impl<K, T> Default for Page<K, T> {
    fn default() -> Self {
        Page {
            key: None,
            generation: 0,
            state: PageState::Loading,
        }
    }
}

impl<K: Clone, T> Page<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PageState<T> {
        &self.state
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Mounts the page for `key`, back in `Loading`
    pub fn enter(&mut self, key: K) -> Ticket {
        self.generation += 1;
        self.key = Some(key);
        self.state = PageState::Loading;
        Ticket(self.generation)
    }

    /// Settles the current mount. Returns false (and changes nothing) if the ticket is stale or
    /// the mount already settled.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<T, ClientError>) -> bool {
        if ticket.0 != self.generation || !self.state.is_loading() {
            debug!(
                "dropping result for stale page mount (ticket {}, current {})",
                ticket.0, self.generation
            );
            return false;
        }
        self.state = match outcome {
            Ok(val) => PageState::Ready(val),
            Err(err) => PageState::Error(err.to_string()),
        };
        true
    }

    /// Re-mounts with the current key after an error; `None` if the page was never mounted
    pub fn retry(&mut self) -> Option<(K, Ticket)> {
        let key = self.key.clone()?;
        let ticket = self.enter(key.clone());
        Some((key, ticket))
    }

    /// Mounts for `key`, runs `fetch` once, and settles with its outcome
    pub async fn load<F, Fut>(&mut self, key: K, fetch: F) -> &PageState<T>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let ticket = self.enter(key.clone());
        let outcome = fetch(key).await;
        self.resolve(ticket, outcome);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_to_ready() {
        let mut page: Page<&str, u32> = Page::new();
        assert!(page.state().is_loading());
        let ticket = page.enter("a");
        assert!(page.resolve(ticket, Ok(7)));
        assert_eq!(page.state(), &PageState::Ready(7));
        // terminal for this mount
        assert!(!page.resolve(ticket, Ok(8)));
        assert_eq!(page.state().ready(), Some(&7));
    }

    #[test]
    fn loading_to_error_and_retry() {
        let mut page: Page<&str, u32> = Page::new();
        assert!(page.retry().is_none());
        let ticket = page.enter("missing");
        page.resolve(
            ticket,
            Err(ClientError::Api {
                status: Some(404),
                message: "Resume not found".to_string(),
            }),
        );
        assert_eq!(page.state().error(), Some("Resume not found"));

        let (key, ticket) = page.retry().unwrap();
        assert_eq!(key, "missing");
        assert!(page.state().is_loading());
        assert!(page.resolve(ticket, Ok(1)));
    }

    #[test]
    fn stale_result_is_dropped() {
        let mut page: Page<&str, &str> = Page::new();
        let first = page.enter("id-1");
        let second = page.enter("id-2");
        assert!(!page.resolve(first, Ok("from id-1")));
        assert!(page.state().is_loading());
        assert!(page.resolve(second, Ok("from id-2")));
        assert_eq!(page.state(), &PageState::Ready("from id-2"));
        assert_eq!(page.key(), Some(&"id-2"));
    }

    #[tokio::test]
    async fn load_runs_fetch_once() {
        let mut page: Page<u32, String> = Page::new();
        let mut calls = 0;
        let state = page
            .load(3, |k| {
                calls += 1;
                async move { Ok(format!("entity {k}")) }
            })
            .await;
        assert_eq!(state, &PageState::Ready("entity 3".to_string()));
        assert_eq!(calls, 1);

        let state = page
            .load(4, |_| async { Err(ClientError::validation("nope")) })
            .await;
        assert_eq!(state.error(), Some("nope"));
    }
}
