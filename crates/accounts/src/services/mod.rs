//! Shared context handed to every workflow.

pub mod mock_clients;

use std::sync::Arc;

use portal_config::AppConfig;
use portal_directory::{DirectoryClient, Mailer};

/// Agreement approved for each new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermsOfService {
    pub id: String,
    pub version: String,
}

impl Default for TermsOfService {
    fn default() -> Self {
        Self {
            id: "test_tos".to_string(),
            version: "version_0".to_string(),
        }
    }
}

/// Remote clients and site settings the workflows run against.
#[derive(Clone)]
pub struct AccountServices {
    pub directory: Arc<dyn DirectoryClient>,
    pub mailer: Arc<dyn Mailer>,
    /// Scopes preference storage per site.
    pub site_id: String,
    pub terms: TermsOfService,
}

impl AccountServices {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        mailer: Arc<dyn Mailer>,
        site_id: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            mailer,
            site_id: site_id.into(),
            terms: TermsOfService::default(),
        }
    }

    /// Build the context from loaded configuration.
    pub fn from_config(
        config: &AppConfig,
        directory: Arc<dyn DirectoryClient>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self::new(directory, mailer, config.session.sitekey.clone()).with_terms(TermsOfService {
            id: config.agreements.tos_id.clone(),
            version: config.agreements.tos_version.clone(),
        })
    }

    pub fn with_terms(mut self, terms: TermsOfService) -> Self {
        self.terms = terms;
        self
    }
}

impl std::fmt::Debug for AccountServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountServices")
            .field("site_id", &self.site_id)
            .field("terms", &self.terms)
            .finish_non_exhaustive()
    }
}
