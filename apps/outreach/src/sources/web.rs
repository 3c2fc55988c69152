//! Web page source: fetch over HTTP and reduce the HTML to visible text.

use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;
use tracing::debug;

use crate::sources::SourceError;

/// Elements whose text content is never shown to a reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Fetches a page and returns its text. Implemented over HTTP in production and by
/// in-memory doubles in tests.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError>;
}

/// Single-attempt HTTP fetcher. The request timeout is the only limit applied; there are
/// no retries.
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Fetch(format!("HTTP {status} for {url}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Fetch(format!("reading body of {url}: {e}")))?;
        debug!("Fetched {} bytes from {url}", body.len());

        Ok(html_to_text(&body))
    }
}

/// Joins the visible text nodes of an HTML document with single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .map(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            .unwrap_or(false);
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_joins_visible_text() {
        let html = r#"
            <html>
              <head><title>Careers</title><style>p { color: red }</style></head>
              <body>
                <h1>Join us</h1>
                <p>Backend roles: <a href="mailto:jobs@acme.io">jobs@acme.io</a></p>
                <script>track("hr@tracker.io")</script>
              </body>
            </html>"#;
        assert_eq!(
            html_to_text(html),
            "Careers Join us Backend roles: jobs@acme.io"
        );
    }

    #[test]
    fn test_html_to_text_plain_input() {
        assert_eq!(html_to_text("just text hr@acme.io"), "just text hr@acme.io");
    }

    #[test]
    fn test_html_to_text_empty() {
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpPageFetcher::new(Duration::from_secs(20)).is_ok());
    }
}
