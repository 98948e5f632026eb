use crate::error::{precondition, Result};

/// Runtime configuration for the campaign core.
///
/// Role resolution at account creation is driven by the admin allow-list and
/// the organization email domain; both are deployment configuration, not code.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    /// Emails that receive the admin role on first sign-in.
    pub admin_emails: Vec<String>,
    /// Principals whose email matches this domain become editors.
    pub organization_domain: String,
    /// Capacity of the per-collection change broadcast channels.
    pub event_channel_capacity: usize,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            admin_emails: vec![
                "admin@nobles.jo".to_string(),
                "manager@nobles.jo".to_string(),
            ],
            organization_domain: "nobles.jo".to_string(),
            event_channel_capacity: 256,
        }
    }
}

impl CampaignConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(emails) = std::env::var("CAMPAIGN_ADMIN_EMAILS") {
            config.admin_emails = emails
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }

        if let Ok(domain) = std::env::var("CAMPAIGN_ORG_DOMAIN") {
            config.organization_domain = domain;
        }

        if let Ok(capacity) = std::env::var("CAMPAIGN_EVENT_CHANNEL_CAPACITY") {
            config.event_channel_capacity = capacity
                .parse()
                .map_err(|e| precondition(format!("Invalid event_channel_capacity: {e}")))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CampaignConfig::default();
        assert!(config.admin_emails.contains(&"admin@nobles.jo".to_string()));
        assert_eq!(config.organization_domain, "nobles.jo");
        assert!(config.event_channel_capacity > 0);
    }
}
