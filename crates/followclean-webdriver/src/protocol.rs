//! Wire types for the subset of the W3C WebDriver protocol the page uses.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Key under which a remote end serializes element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f78b8ee5ba3";

/// A reference to an element in the remote document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebElement {
    #[serde(rename = "element-6066-11e4-a52e-4f78b8ee5ba3")]
    pub id: String,
}

/// Every WebDriver response wraps its payload in `{"value": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
}

#[derive(Debug, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct NewSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

/// How to obtain a browser.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Attach to a browser already running with remote debugging at this
    /// `host:port`, which keeps the user's logged-in profile.
    pub debugger_address: Option<String>,
    pub headless: bool,
}

impl SessionOptions {
    pub fn capabilities(&self) -> Value {
        let mut chrome = serde_json::Map::new();
        if let Some(address) = &self.debugger_address {
            chrome.insert("debuggerAddress".into(), json!(address));
        } else if self.headless {
            chrome.insert("args".into(), json!(["--headless=new", "--window-size=1280,2000"]));
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": chrome,
                }
            }
        })
    }
}

pub fn css(selector: &str) -> Value {
    json!({ "using": "css selector", "value": selector })
}

pub fn script(body: &str, args: Vec<Value>) -> Value {
    json!({ "script": body, "args": args })
}
