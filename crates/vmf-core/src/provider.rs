//! Provider enumeration

use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Target platform for VM provisioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Amazon Web Services
    Aws,
    /// Microsoft Azure
    Azure,
    /// Google Cloud Platform
    Gcp,
    /// Self-hosted hypervisor
    OnPremise,
}

impl Provider {
    /// Every provider, in declaration order
    pub const ALL: [Provider; 4] = [Self::Aws, Self::Azure, Self::Gcp, Self::OnPremise];

    /// Wire tag
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
            Self::OnPremise => "onpremise",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RequestError::UnsupportedProvider(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_tags() {
        for provider in Provider::ALL {
            assert_eq!(provider.as_str().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(matches!(
            "AWS".parse::<Provider>(),
            Err(RequestError::UnsupportedProvider(tag)) if tag == "AWS"
        ));
    }

    #[test]
    fn serde_uses_wire_tag() {
        let json = serde_json::to_string(&Provider::OnPremise).unwrap();
        assert_eq!(json, "\"onpremise\"");
    }
}
