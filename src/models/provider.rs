//! Source-control provider enum.

use serde::{Deserialize, Serialize};

/// Which REST flavor a tracked repository speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Gitlab,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Gitlab => "gitlab",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "github" => Some(Provider::Github),
            "gitlab" => Some(Provider::Gitlab),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sprint lifecycle state mirrored from the issue tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Active,
    Closed,
    Future,
}

impl SprintState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SprintState::Active => "active",
            SprintState::Closed => "closed",
            SprintState::Future => "future",
        }
    }

    /// Upstream states outside the known set fall back to Future.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => SprintState::Active,
            "closed" => SprintState::Closed,
            _ => SprintState::Future,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_round_trip() {
        assert_eq!(Provider::parse("github"), Some(Provider::Github));
        assert_eq!(Provider::parse("gitlab"), Some(Provider::Gitlab));
        assert_eq!(Provider::parse("bitbucket"), None);
        assert_eq!(Provider::Github.as_str(), "github");
    }

    #[test]
    fn test_sprint_state_parse() {
        assert_eq!(SprintState::parse("active"), SprintState::Active);
        assert_eq!(SprintState::parse("closed"), SprintState::Closed);
        assert_eq!(SprintState::parse("future"), SprintState::Future);
        assert_eq!(SprintState::parse("unknown"), SprintState::Future);
    }
}
