// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every French-language generation system prompt.
pub const PLAIN_TEXT_ONLY: &str = "Réponds uniquement avec le texte demandé, \
    sans balises markdown, sans commentaire ni explication.";
