// Prompt constants for application emails and cover letters.
// Outreach targets French-speaking recruiters, so prompts and the generic template are French.

/// System prompt for subject + body generation.
pub const EMAIL_SYSTEM: &str = "Tu es un assistant qui rédige des emails de candidature \
    concis en français. Crée un objet et un corps adaptés au poste et à l'entreprise. \
    La première ligne de ta réponse est l'objet, les lignes suivantes sont le corps.";

/// Email prompt template. Replace `{company}` and `{job_text}` before sending.
pub const EMAIL_PROMPT_TEMPLATE: &str = "Entreprise: {company}

Description du poste:
{job_text}

Consignes: objet court et percutant; corps poli, professionnel, avec appel à l'action.";

/// System prompt for cover letter adaptation.
pub const LETTER_SYSTEM: &str = "Tu es un assistant expert en rédaction de lettres de \
    motivation en français. Adapte le modèle précisément à l'offre d'emploi, ton \
    professionnel et concis (~1 page).";

/// Letter prompt template. Replace `{template_text}` and `{job_text}` before sending.
pub const LETTER_PROMPT_TEMPLATE: &str = "Modèle de lettre:
{template_text}

Offre d'emploi:
{job_text}

Consignes: génère la lettre finale en français. Conserve les compétences clés, \
ajoute une motivation claire et adapte au poste.";

/// Body sent when no job description is available.
pub const GENERIC_BODY: &str = "Bonjour,

Je vous contacte pour vous proposer ma candidature. Vous trouverez ci-joint mon CV ainsi qu'une lettre de motivation.

Je reste à votre disposition pour tout échange.

Cordialement,
";
