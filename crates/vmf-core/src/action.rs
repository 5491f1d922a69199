//! Lifecycle actions

use crate::error::ProvisioningError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Power action requested against a VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VmAction {
    /// Power on
    Start,
    /// Power off
    Stop,
    /// Power cycle (ends running)
    Restart,
}

impl VmAction {
    /// Every action, in declaration order
    pub const ALL: [VmAction; 3] = [Self::Start, Self::Stop, Self::Restart];

    /// Wire token
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

impl std::fmt::Display for VmAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VmAction {
    type Err = ProvisioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ProvisioningError::InvalidAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tokens() {
        assert_eq!("start".parse::<VmAction>().unwrap(), VmAction::Start);
        assert_eq!("stop".parse::<VmAction>().unwrap(), VmAction::Stop);
        assert_eq!("restart".parse::<VmAction>().unwrap(), VmAction::Restart);
    }

    #[test]
    fn unknown_token_is_invalid_action() {
        let err = "reboot".parse::<VmAction>().unwrap_err();
        assert_eq!(err, ProvisioningError::InvalidAction("reboot".into()));
    }
}
