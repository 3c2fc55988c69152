/// Consumer mail providers whose domain says nothing about an employer.
const FREEMAIL_PROVIDERS: &[&str] = &[
    "gmail", "yahoo", "hotmail", "outlook", "live", "icloud", "proton", "pm", "aol",
];

/// Infers a short company label from the second-level domain of `addr`.
///
/// Returns an empty string for freemail providers and for input without an `@`.
pub fn company_from_email(addr: &str) -> String {
    let Some((_, domain)) = addr.split_once('@') else {
        return String::new();
    };
    let domain = domain.to_lowercase();
    let labels: Vec<&str> = domain.split('.').collect();
    let sld = if labels.len() >= 2 {
        labels[labels.len() - 2]
    } else {
        labels[0]
    };

    if FREEMAIL_PROVIDERS.contains(&sld) {
        return String::new();
    }
    sld.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freemail_has_no_company() {
        assert_eq!(company_from_email("alice@gmail.com"), "");
        assert_eq!(company_from_email("alice@pm.me"), "");
        assert_eq!(company_from_email("alice@proton.me"), "");
    }

    #[test]
    fn test_corporate_domain_gives_sld() {
        assert_eq!(company_from_email("bob@acme.io"), "acme");
    }

    #[test]
    fn test_company_is_lowercased() {
        assert_eq!(company_from_email("Bob@ACME.IO"), "acme");
    }

    #[test]
    fn test_nested_domain_takes_second_to_last_label() {
        assert_eq!(company_from_email("jobs@careers.initech.com"), "initech");
        // Country-code second levels are taken literally.
        assert_eq!(company_from_email("jane@example.co.uk"), "co");
    }

    #[test]
    fn test_single_label_domain() {
        assert_eq!(company_from_email("root@localhost"), "localhost");
    }

    #[test]
    fn test_malformed_address_is_soft_failure() {
        assert_eq!(company_from_email("bad-address"), "");
        assert_eq!(company_from_email(""), "");
    }

    #[test]
    fn test_only_first_at_splits() {
        assert_eq!(company_from_email("a@b@acme.io"), "b@acme");
    }
}
