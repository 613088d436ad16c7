use std::fmt;
use std::time::Duration;

use crate::error::SessionError;

/// How an element on the portal is found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Id(String),
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Locator::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Locator::XPath(query.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(id) => write!(f, "#{id}"),
            Locator::Css(selector) => write!(f, "{selector}"),
            Locator::XPath(query) => write!(f, "xpath:{query}"),
        }
    }
}

/// One entry of a dropdown control, as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub text: String,
    pub enabled: bool,
}

impl SelectOption {
    pub fn new(text: impl Into<String>, enabled: bool) -> Self {
        Self {
            text: text.into(),
            enabled,
        }
    }
}

/// The UI automation capability the scraper drives.
///
/// Every call blocks the caller. Waits are bounded by the timeout they are
/// given and report [`SessionError::Timeout`] when it elapses. Lookups that do
/// not wait (`click`, `text_of`, ...) act on whatever is rendered right now.
pub trait Session {
    fn open(&mut self, url: &str) -> Result<(), SessionError>;

    /// Wait until `target` is present and visible.
    fn await_ready(&mut self, target: &Locator, timeout: Duration) -> Result<(), SessionError>;

    /// Wait until `target` is visible and not disabled.
    fn await_clickable(&mut self, target: &Locator, timeout: Duration)
    -> Result<(), SessionError>;

    fn click(&mut self, target: &Locator) -> Result<(), SessionError>;

    /// Click through a script call rather than a pointer event. Needed for
    /// inputs hidden behind styled labels.
    fn script_click(&mut self, target: &Locator) -> Result<(), SessionError>;

    fn type_text(&mut self, target: &Locator, text: &str) -> Result<(), SessionError>;

    fn is_selected(&mut self, target: &Locator) -> Result<bool, SessionError>;

    fn select_by_text(&mut self, target: &Locator, text: &str) -> Result<(), SessionError>;

    fn options(&mut self, target: &Locator) -> Result<Vec<SelectOption>, SessionError>;

    /// Text of the first match, or `None` when nothing matches.
    fn text_of(&mut self, target: &Locator) -> Result<Option<String>, SessionError>;

    /// Text of every match, in document order.
    fn texts_of(&mut self, target: &Locator) -> Result<Vec<String>, SessionError>;

    /// Give the page time to settle after an action.
    fn settle(&mut self, pause: Duration);

    /// Tear the session down. Must be safe to call more than once.
    fn close(&mut self) -> Result<(), SessionError>;

    /// Wait for `target` to become clickable, then click it.
    fn click_when_ready(&mut self, target: &Locator, timeout: Duration) -> Result<(), SessionError> {
        self.await_clickable(target, timeout)?;
        self.click(target)
    }
}
