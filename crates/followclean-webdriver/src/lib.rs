//! A [`HostPage`] backed by a live browser driven over W3C WebDriver.
//!
//! Point it at a chromedriver (or any W3C remote end). With a debugger
//! address the session attaches to an already-running Chrome, so the
//! logged-in x.com profile is reused instead of a fresh one.

pub mod error;
pub mod protocol;

pub use error::{Result, WebDriverError};
pub use protocol::{SessionOptions, WebElement};

use std::sync::Arc;
use std::time::Duration;

use followclean_core::extract::{
    CARD_SELECTOR, CONFIRMATION_SELECTOR, Extractor, TRIGGER_SELECTOR, XCardExtractor,
};
use followclean_core::{Account, HostPage, PageError};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use protocol::{Envelope, ErrorValue, NewSession, css, script};

pub struct WebDriverPage {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
    extractor: Arc<dyn Extractor>,
}

impl WebDriverPage {
    /// Open a new session on the remote end at `base_url`.
    pub async fn connect(base_url: &str, options: &SessionOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let resp = client
            .post(format!("{base_url}/session"))
            .json(&options.capabilities())
            .send()
            .await?;
        let session: NewSession = read_response(resp).await?;
        info!(session = %session.session_id, attached = options.debugger_address.is_some(), "WebDriver session opened");

        Ok(Self {
            client,
            base_url,
            session_id: session.session_id,
            extractor: Arc::new(XCardExtractor),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        self.command::<Value>(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    /// End the session. An attached browser stays open; a launched one exits.
    pub async fn close(&self) -> Result<()> {
        self.command::<Value>(Method::DELETE, "", None).await?;
        info!(session = %self.session_id, "WebDriver session closed");
        Ok(())
    }

    async fn command<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        read_response(request.send().await?).await
    }

    async fn find_elements(&self, from: Option<&WebElement>, selector: &str) -> Result<Vec<WebElement>> {
        let path = match from {
            Some(el) => format!("/element/{}/elements", el.id),
            None => "/elements".to_string(),
        };
        self.command(Method::POST, &path, Some(css(selector))).await
    }

    async fn execute(&self, body: &str, args: Vec<Value>) -> Result<Value> {
        self.command(Method::POST, "/execute/sync", Some(script(body, args)))
            .await
    }

    async fn outer_html(&self, el: &WebElement) -> Result<String> {
        let value: Value = self
            .command(Method::GET, &format!("/element/{}/property/outerHTML", el.id), None)
            .await?;
        match value {
            Value::String(html) => Ok(html),
            other => Err(WebDriverError::Protocol(format!("outerHTML was {other}"))),
        }
    }
}

async fn read_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(match serde_json::from_str::<Envelope<ErrorValue>>(&text) {
            Ok(envelope) => WebDriverError::Api {
                status: status.as_u16(),
                error: envelope.value.error,
                message: envelope.value.message,
            },
            Err(_) => WebDriverError::Api {
                status: status.as_u16(),
                error: "unknown error".to_string(),
                message: text,
            },
        });
    }
    Ok(serde_json::from_str::<Envelope<T>>(&text)?.value)
}

impl HostPage for WebDriverPage {
    type Row = WebElement;
    type Control = WebElement;

    async fn scroll_to(&self, y: u32) -> std::result::Result<(), PageError> {
        self.execute("window.scrollTo(0, arguments[0]);", vec![json!(y)])
            .await?;
        Ok(())
    }

    async fn scroll_by(&self, dy: u32) -> std::result::Result<(), PageError> {
        self.execute("window.scrollBy(0, arguments[0]);", vec![json!(dy)])
            .await?;
        Ok(())
    }

    async fn visible_rows(&self) -> std::result::Result<Vec<WebElement>, PageError> {
        Ok(self.find_elements(None, CARD_SELECTOR).await?)
    }

    async fn extract(&self, row: &WebElement) -> std::result::Result<Option<Account>, PageError> {
        let html = self.outer_html(row).await?;
        Ok(self.extractor.extract(&html))
    }

    async fn locate_trigger(
        &self,
        row: &WebElement,
    ) -> std::result::Result<Option<WebElement>, PageError> {
        Ok(self
            .find_elements(Some(row), TRIGGER_SELECTOR)
            .await?
            .into_iter()
            .next())
    }

    async fn activate(&self, control: &WebElement) -> std::result::Result<(), PageError> {
        self.command::<Value>(
            Method::POST,
            &format!("/element/{}/click", control.id),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn locate_confirmation(&self) -> std::result::Result<Option<WebElement>, PageError> {
        Ok(self
            .find_elements(None, CONFIRMATION_SELECTOR)
            .await?
            .into_iter()
            .next())
    }
}
