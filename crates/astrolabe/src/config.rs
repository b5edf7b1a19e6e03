use serde::Deserialize;

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Member synthesis section
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// Member synthesis configuration section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SynthesisConfig {
    /// What to do with association roles that have no name
    #[serde(default)]
    pub unnamed_roles: UnnamedRolePolicy,
}

/// How roles without a name are turned into members.
///
/// ```toml
/// [synthesis.unnamed_roles]
/// policy = "fallback"
/// prefix = "UnnamedRole"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum UnnamedRolePolicy {
    /// Unnamed roles produce no member.
    #[default]
    Skip,
    /// Unnamed roles are named `{prefix}{A|B}_{n}`, with `n` counting the
    /// unnamed roles of one classifier from 1.
    Fallback {
        #[serde(default = "default_prefix")]
        prefix: String,
    },
}

fn default_prefix() -> String {
    "UnnamedRole".to_string()
}

impl UnnamedRolePolicy {
    /// Fallback policy with the default `UnnamedRole` prefix.
    pub fn fallback() -> Self {
        Self::Fallback {
            prefix: default_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skips_unnamed_roles() {
        assert_eq!(
            AppConfig::default().synthesis.unnamed_roles,
            UnnamedRolePolicy::Skip
        );
    }
}
