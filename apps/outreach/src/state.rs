use std::sync::Arc;

use crate::config::Config;
use crate::extraction::filter::KeywordFilter;
use crate::extraction::matcher::EmailMatcher;
use crate::llm_client::TextGenerator;
use crate::outreach::mailer::Mailer;
use crate::sources::TextResolver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Compiled once at startup.
    pub matcher: Arc<EmailMatcher>,
    pub filter: KeywordFilter,
    pub resolver: TextResolver,
    /// `None` when no API key is configured; composition falls back to the generic email.
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Real mail transport. `None` means only dry runs are accepted.
    pub mailer: Option<Arc<dyn Mailer>>,
}
