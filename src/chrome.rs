use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use log::{debug, info, warn};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::BrowserConfig,
    error::SessionError,
    session::{Locator, SelectOption, Session},
};

const POLL_INTERVAL: Duration = Duration::from_millis(200);
// Long settle pauses must not look like a dead connection.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

const VISIBLE_FN: &str =
    "const visible = (n) => !!(n.offsetWidth || n.offsetHeight || n.getClientRects().length);";

// Hidden nodes read as empty, like a WebDriver element's text. Dismissed
// dialogs stay in the DOM.
const TEXT_OF: &str =
    "return nodes.length && visible(nodes[0]) ? nodes[0].innerText.trim() : null;";
const TEXTS_OF: &str = "return nodes.filter(visible).map((n) => n.innerText.trim());";

/// A [`Session`] backed by a headless Chrome tab.
pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Option<Arc<Tab>>,
}

impl ChromeSession {
    pub fn launch(config: &BrowserConfig) -> anyhow::Result<Self> {
        let user_agent = format!("--user-agent={}", config.user_agent);
        let args: Vec<&OsStr> = std::iter::once(user_agent.as_str())
            .chain(config.extra_args.iter().map(String::as_str))
            .map(OsStr::new)
            .collect();

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(config.sandbox)
            .window_size(Some(config.window_size))
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .args(args)
            .build()
            .map_err(|e| anyhow::anyhow!("invalid browser launch options: {e}"))?;

        let browser = Browser::new(options).context("failed to launch Chrome")?;
        let tab = browser.new_tab().context("failed to open a browser tab")?;
        info!("Launched headless Chrome");
        Ok(Self {
            browser: Some(browser),
            tab: Some(tab),
        })
    }

    fn tab(&self) -> Result<&Arc<Tab>, SessionError> {
        self.tab
            .as_ref()
            .ok_or_else(|| SessionError::Browser("session already closed".to_string()))
    }

    fn element(&self, target: &Locator) -> Result<Element<'_>, SessionError> {
        let tab = self.tab()?;
        let found = match target {
            Locator::Id(id) => tab.find_element(&format!("#{id}")),
            Locator::Css(selector) => tab.find_element(selector),
            Locator::XPath(query) => tab.find_element_by_xpath(query),
        };
        found.map_err(|e| {
            debug!("lookup of {target} failed: {e:#}");
            SessionError::NotFound(target.clone())
        })
    }

    /// Run `body` against the nodes matching `target` and decode its result.
    fn eval<T: DeserializeOwned>(&self, target: &Locator, body: &str) -> Result<T, SessionError> {
        let result = self.tab()?.evaluate(&script(target, body), false)?;
        let Some(serde_json::Value::String(json)) = result.value else {
            return Err(SessionError::Browser(format!(
                "script on {target} returned no value"
            )));
        };
        serde_json::from_str(&json).map_err(|e| {
            SessionError::Browser(format!("unexpected script result for {target}: {e}"))
        })
    }

    fn poll(&self, target: &Locator, timeout: Duration, check: &str) -> Result<(), SessionError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.eval::<bool>(target, check) {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                // The page may be mid-navigation; keep polling until the deadline.
                Err(e) => debug!("waiting for {target}: {e}"),
            }
            if Instant::now() >= deadline {
                return Err(SessionError::Timeout {
                    target: target.clone(),
                    waited: timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[derive(Deserialize)]
struct OptionEntry {
    text: String,
    enabled: bool,
}

impl Session for ChromeSession {
    fn open(&mut self, url: &str) -> Result<(), SessionError> {
        let tab = self.tab()?;
        tab.navigate_to(url)?;
        tab.wait_until_navigated()?;
        Ok(())
    }

    fn await_ready(&mut self, target: &Locator, timeout: Duration) -> Result<(), SessionError> {
        self.poll(target, timeout, "return nodes.length > 0 && visible(nodes[0]);")
    }

    fn await_clickable(
        &mut self,
        target: &Locator,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        self.poll(
            target,
            timeout,
            "return nodes.length > 0 && visible(nodes[0]) && !nodes[0].disabled;",
        )
    }

    fn click(&mut self, target: &Locator) -> Result<(), SessionError> {
        self.element(target)?.click()?;
        Ok(())
    }

    fn script_click(&mut self, target: &Locator) -> Result<(), SessionError> {
        let clicked: bool = self.eval(
            target,
            "if (!nodes.length) return false; nodes[0].click(); return true;",
        )?;
        if clicked {
            Ok(())
        } else {
            Err(SessionError::NotFound(target.clone()))
        }
    }

    fn type_text(&mut self, target: &Locator, text: &str) -> Result<(), SessionError> {
        self.element(target)?.type_into(text)?;
        Ok(())
    }

    fn is_selected(&mut self, target: &Locator) -> Result<bool, SessionError> {
        let selected: Option<bool> = self.eval(
            target,
            "return nodes.length ? !!(nodes[0].checked || nodes[0].selected) : null;",
        )?;
        selected.ok_or_else(|| SessionError::NotFound(target.clone()))
    }

    fn select_by_text(&mut self, target: &Locator, text: &str) -> Result<(), SessionError> {
        let body = format!(
            "if (!nodes.length) return null;
             const select = nodes[0];
             const option = Array.from(select.options).find((o) => o.text.trim() === {wanted});
             if (!option) return false;
             select.value = option.value;
             select.dispatchEvent(new Event('change', {{ bubbles: true }}));
             return true;",
            wanted = js_string(text.trim()),
        );
        match self.eval::<Option<bool>>(target, &body)? {
            Some(true) => Ok(()),
            Some(false) => Err(SessionError::NoSuchOption {
                target: target.clone(),
                text: text.to_string(),
            }),
            None => Err(SessionError::NotFound(target.clone())),
        }
    }

    fn options(&mut self, target: &Locator) -> Result<Vec<SelectOption>, SessionError> {
        let entries: Option<Vec<OptionEntry>> = self.eval(
            target,
            "if (!nodes.length) return null;
             return Array.from(nodes[0].options).map((o) => ({
                 text: o.text,
                 enabled: !o.disabled && !(o.parentElement && o.parentElement.disabled),
             }));",
        )?;
        let entries = entries.ok_or_else(|| SessionError::NotFound(target.clone()))?;
        Ok(entries
            .into_iter()
            .map(|entry| SelectOption::new(entry.text, entry.enabled))
            .collect())
    }

    fn text_of(&mut self, target: &Locator) -> Result<Option<String>, SessionError> {
        self.eval(target, TEXT_OF)
    }

    fn texts_of(&mut self, target: &Locator) -> Result<Vec<String>, SessionError> {
        self.eval(target, TEXTS_OF)
    }

    fn settle(&mut self, pause: Duration) {
        thread::sleep(pause);
    }

    fn close(&mut self) -> Result<(), SessionError> {
        if let Some(tab) = self.tab.take() {
            if let Err(e) = tab.close(true) {
                warn!("Failed to close browser tab: {e:#}");
            }
        }
        // Dropping the browser kills the Chrome process.
        if self.browser.take().is_some() {
            info!("Browser session closed");
        }
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Wrap `body` in a function over the nodes matching `target`; the result is
/// JSON-encoded so it comes back as a single string.
fn script(target: &Locator, body: &str) -> String {
    format!(
        "JSON.stringify((function (nodes) {{ {VISIBLE_FN} {body} }})({}))",
        collect_nodes(target)
    )
}

fn collect_nodes(target: &Locator) -> String {
    match target {
        Locator::Id(id) => format!("[document.getElementById({})].filter(Boolean)", js_string(id)),
        Locator::Css(selector) => {
            format!("Array.from(document.querySelectorAll({}))", js_string(selector))
        }
        Locator::XPath(query) => format!(
            "(function () {{
                const r = document.evaluate({}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const out = [];
                for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i));
                return out;
            }})()",
            js_string(query)
        ),
    }
}

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_escaped_for_scripts() {
        assert_eq!(js_string("Choose..."), r#""Choose...""#);
        assert_eq!(
            js_string(r#"//a[@class="x" and contains(., 'y')]"#),
            r#""//a[@class=\"x\" and contains(., 'y')]""#
        );
    }

    #[test]
    fn node_collection_matches_locator_kind() {
        assert_eq!(
            collect_nodes(&Locator::id("nextButton")),
            r#"[document.getElementById("nextButton")].filter(Boolean)"#
        );
        assert_eq!(
            collect_nodes(&Locator::css("span.d")),
            r#"Array.from(document.querySelectorAll("span.d"))"#
        );
        let xpath = collect_nodes(&Locator::xpath("//span[@class='d']"));
        assert!(xpath.contains(r#"document.evaluate("//span[@class='d']""#));
        assert!(xpath.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
    }

    #[test]
    fn scripts_return_json() {
        let js = script(&Locator::id("CAR"), "return true;");
        assert!(js.starts_with("JSON.stringify((function (nodes) {"));
        assert!(js.contains("return true;"));
        assert!(js.ends_with(r#"([document.getElementById("CAR")].filter(Boolean)))"#));
    }

    #[test]
    fn text_reads_skip_hidden_nodes() {
        let alert = script(&Locator::id("dijit_Dialog_0"), TEXT_OF);
        assert!(alert.contains(VISIBLE_FN));
        assert!(alert.contains("visible(nodes[0]) ? nodes[0].innerText.trim() : null"));

        let slots = script(&Locator::xpath("//a[contains(@class, 'available')]"), TEXTS_OF);
        assert!(slots.contains("nodes.filter(visible).map("));
        assert!(!TEXTS_OF.contains("nodes.map("));
    }
}
