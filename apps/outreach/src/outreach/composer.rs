//! Email and cover-letter composition.
//!
//! Without a job description (or without a configured model) every recipient gets the
//! generic application email. With one, the model writes subject and body.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::prompts::PLAIN_TEXT_ONLY;
use crate::llm_client::{LlmError, TextGenerator};
use crate::outreach::prompts::{
    EMAIL_PROMPT_TEMPLATE, EMAIL_SYSTEM, GENERIC_BODY, LETTER_PROMPT_TEMPLATE, LETTER_SYSTEM,
};

pub const SUBJECT_MAX_CHARS: usize = 150;
const DEFAULT_SUBJECT: &str = "Candidature";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// The generic application email, optionally addressed to `company`.
pub fn generic_draft(company: &str) -> EmailDraft {
    let subject = if company.is_empty() {
        DEFAULT_SUBJECT.to_string()
    } else {
        format!("{DEFAULT_SUBJECT} – {company}")
    };
    EmailDraft {
        subject: truncate_chars(&subject, SUBJECT_MAX_CHARS),
        body: GENERIC_BODY.to_string(),
    }
}

pub async fn compose_email(
    generator: Option<&dyn TextGenerator>,
    job_text: &str,
    company: &str,
) -> Result<EmailDraft, LlmError> {
    let job_text = job_text.trim();
    let generator = match generator {
        Some(g) if !job_text.is_empty() => g,
        _ => {
            debug!("Using generic draft for '{company}'");
            return Ok(generic_draft(company));
        }
    };

    let prompt = EMAIL_PROMPT_TEMPLATE
        .replace("{company}", company)
        .replace("{job_text}", job_text);
    let system = format!("{EMAIL_SYSTEM} {PLAIN_TEXT_ONLY}");
    let text = generator.generate(&prompt, &system).await?;
    Ok(split_subject_body(&text))
}

/// First non-empty line is the subject, the remaining non-empty lines the body.
/// A single-line reply is used as both.
fn split_subject_body(text: &str) -> EmailDraft {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let subject = lines
        .first()
        .map(|l| truncate_chars(l, SUBJECT_MAX_CHARS))
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
    let body = if lines.len() > 1 {
        lines[1..].join("\n")
    } else {
        text.trim().to_string()
    };
    EmailDraft { subject, body }
}

/// Adapts a cover-letter template to a job description.
pub async fn generate_letter(
    generator: &dyn TextGenerator,
    template_text: &str,
    job_text: &str,
    extra_instructions: &str,
) -> Result<String, LlmError> {
    let mut prompt = LETTER_PROMPT_TEMPLATE
        .replace("{template_text}", template_text.trim())
        .replace("{job_text}", job_text.trim());
    if !extra_instructions.trim().is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(extra_instructions.trim());
    }
    let system = format!("{LETTER_SYSTEM} {PLAIN_TEXT_ONLY}");
    generator.generate(&prompt, &system).await
}

/// Replaces runs of characters outside `[A-Za-z0-9._-]` with `_` and trims `.`/`_`.
pub fn safe_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    let trimmed = out.trim_matches(['.', '_']);
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `lettre_{company}{ext}`, or `lettre_de_motivation{ext}` without a company.
pub fn letter_filename(company: &str, ext: &str) -> String {
    let base = if company.is_empty() {
        "lettre_de_motivation".to_string()
    } else {
        format!("lettre_{company}")
    };
    format!("{}{ext}", safe_filename(&base))
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a fixed reply and records the last prompt it saw.
    struct CannedGenerator {
        reply: String,
        last_prompt: Mutex<Option<String>>,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl TextGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    #[test]
    fn test_generic_draft_with_company() {
        let draft = generic_draft("acme");
        assert_eq!(draft.subject, "Candidature – acme");
        assert!(draft.body.starts_with("Bonjour,"));
    }

    #[test]
    fn test_generic_draft_without_company() {
        assert_eq!(generic_draft("").subject, "Candidature");
    }

    #[tokio::test]
    async fn test_blank_job_text_skips_generator() {
        let generator = FailingGenerator;
        let draft = compose_email(Some(&generator as &dyn TextGenerator), "   ", "acme")
            .await
            .unwrap();
        assert_eq!(draft, generic_draft("acme"));
    }

    #[tokio::test]
    async fn test_no_generator_uses_generic() {
        let draft = compose_email(None, "Rust backend role", "acme").await.unwrap();
        assert_eq!(draft, generic_draft("acme"));
    }

    #[tokio::test]
    async fn test_generated_reply_is_split() {
        let generator =
            CannedGenerator::new("Candidature Backend Rust\n\nBonjour,\nJe postule.\n\nMerci");
        let draft = compose_email(
            Some(&generator as &dyn TextGenerator),
            "Rust backend role",
            "acme",
        )
        .await
        .unwrap();
        assert_eq!(draft.subject, "Candidature Backend Rust");
        assert_eq!(draft.body, "Bonjour,\nJe postule.\nMerci");

        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Entreprise: acme"));
        assert!(prompt.contains("Rust backend role"));
    }

    #[tokio::test]
    async fn test_single_line_reply_is_subject_and_body() {
        let generator = CannedGenerator::new("Candidature spontanée");
        let draft = compose_email(Some(&generator as &dyn TextGenerator), "role", "")
            .await
            .unwrap();
        assert_eq!(draft.subject, "Candidature spontanée");
        assert_eq!(draft.body, "Candidature spontanée");
    }

    #[tokio::test]
    async fn test_long_subject_truncated() {
        let reply = format!("{}\nbody", "é".repeat(200));
        let generator = CannedGenerator::new(&reply);
        let draft = compose_email(Some(&generator as &dyn TextGenerator), "role", "acme")
            .await
            .unwrap();
        assert_eq!(draft.subject.chars().count(), SUBJECT_MAX_CHARS);
    }

    #[tokio::test]
    async fn test_generator_error_propagates() {
        let generator = FailingGenerator;
        let result = compose_email(Some(&generator as &dyn TextGenerator), "role", "acme").await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_letter_prompt_includes_template_job_and_extras() {
        let generator = CannedGenerator::new("Madame, Monsieur, ...");
        let letter = generate_letter(
            &generator,
            "Modèle: je suis développeur",
            "Poste Rust chez Acme",
            "Mentionne mon expérience en Go",
        )
        .await
        .unwrap();
        assert_eq!(letter, "Madame, Monsieur, ...");

        let prompt = generator.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Modèle: je suis développeur"));
        assert!(prompt.contains("Poste Rust chez Acme"));
        assert!(prompt.ends_with("Mentionne mon expérience en Go"));
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename("lettre acme/ß?.docx"), "lettre_acme_.docx");
        assert_eq!(safe_filename("__..weird__"), "weird");
        assert_eq!(safe_filename("???"), "file");
        assert_eq!(safe_filename("cv-2024.pdf"), "cv-2024.pdf");
    }

    #[test]
    fn test_letter_filename() {
        assert_eq!(letter_filename("acme", ".docx"), "lettre_acme.docx");
        assert_eq!(letter_filename("", ".docx"), "lettre_de_motivation.docx");
    }
}
