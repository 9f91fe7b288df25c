//! Deterministic provider for development builds

use async_trait::async_trait;
use std::collections::BTreeSet;

use super::provider::EnrichmentProvider;
use super::types::{ContactProfile, EnrichmentField, FoundFields};
use crate::contacts::CompanyName;
use crate::contacts::validation::guess_domain;
use crate::error::ProviderError;

/// Best-effort guesses derived from the contact itself.
///
/// - email: `first.last@<company-domain>` (needs a company name)
/// - social: LinkedIn URL slug from the full name
/// - company: echoes the existing company name, if any
/// - phone: never found
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticEnrichmentProvider;

fn slug(part: &str) -> String {
    part.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[async_trait]
impl EnrichmentProvider for SyntheticEnrichmentProvider {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn lookup(
        &self,
        profile: &ContactProfile,
        requested: &BTreeSet<EnrichmentField>,
    ) -> Result<FoundFields, ProviderError> {
        let first = slug(&profile.first_name);
        let last = slug(&profile.last_name);
        let company = profile.company_name.as_deref().and_then(CompanyName::parse);

        let mut found = FoundFields::new();
        for field in requested {
            let value = match field {
                EnrichmentField::Email => {
                    let domain = company.as_ref().and_then(guess_domain);
                    match (domain, first.is_empty()) {
                        (Some(domain), false) if last.is_empty() => {
                            Some(format!("{}@{}", first, domain))
                        }
                        (Some(domain), false) => Some(format!("{}.{}@{}", first, last, domain)),
                        _ => None,
                    }
                }
                EnrichmentField::Social if !first.is_empty() => {
                    let handle = [first.as_str(), last.as_str()]
                        .iter()
                        .filter(|s| !s.is_empty())
                        .copied()
                        .collect::<Vec<_>>()
                        .join("-");
                    Some(format!("https://www.linkedin.com/in/{}", handle))
                }
                EnrichmentField::Company => company.as_ref().map(|c| c.as_str().to_string()),
                _ => None,
            };
            if let Some(value) = value {
                found.insert(*field, value);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn profile(company: Option<&str>) -> ContactProfile {
        ContactProfile {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            company_name: company.map(String::from),
            known: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_guesses_email_and_social() {
        let requested: BTreeSet<_> = EnrichmentField::ALL.into_iter().collect();
        let found = SyntheticEnrichmentProvider
            .lookup(&profile(Some("Analytical Engines Ltd")), &requested)
            .await
            .unwrap();

        assert_eq!(
            found.get(&EnrichmentField::Email).map(String::as_str),
            Some("ada.lovelace@analyticalenginesltd.com")
        );
        assert_eq!(
            found.get(&EnrichmentField::Social).map(String::as_str),
            Some("https://www.linkedin.com/in/ada-lovelace")
        );
        assert!(!found.contains_key(&EnrichmentField::Phone));
    }

    #[tokio::test]
    async fn test_no_company_no_email() {
        let requested: BTreeSet<_> = [EnrichmentField::Email].into_iter().collect();
        let found = SyntheticEnrichmentProvider
            .lookup(&profile(None), &requested)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
