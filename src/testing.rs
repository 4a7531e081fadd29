//! In-memory stand-ins for the network collaborators, used by unit tests.

use crate::api::AskAsync;
use crate::error::{FetchError, SummarizeError};
use crate::fetch::FetchHtml;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

/// Serves fixed bodies by URL; unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
    requested: RefCell<Vec<String>>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

impl FetchHtml for StaticPages {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.requested.borrow_mut().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Replies with canned answers in order and records every prompt.
#[derive(Debug, Default)]
pub struct ScriptedAsk {
    replies: RefCell<VecDeque<String>>,
    prompts: RefCell<Vec<String>>,
    used: RefCell<Vec<String>>,
    fail: bool,
}

impl ScriptedAsk {
    pub fn replying(replies: &[&str]) -> Self {
        Self {
            replies: RefCell::new(replies.iter().map(|r| r.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn replies_used(&self) -> Vec<String> {
        self.used.borrow().clone()
    }
}

impl AskAsync for ScriptedAsk {
    type Response = String;

    async fn ask(&self, text: &str) -> Result<String, SummarizeError> {
        self.prompts.borrow_mut().push(text.to_string());
        if self.fail {
            return Err(SummarizeError::Unavailable("backend offline".into()));
        }
        let reply = self
            .replies
            .borrow_mut()
            .pop_front()
            .ok_or(SummarizeError::EmptyResponse)?;
        self.used.borrow_mut().push(reply.clone());
        Ok(reply)
    }
}
