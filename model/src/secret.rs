use crate::error::{self, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The key under which a job refers to one of its secrets, e.g. `vcenterCredentials`.
pub type SecretType = String;

const MAX_SECRET_NAME_LEN: usize = 253;

/// The name of a secret that the framework has mounted for an agent. Each secret is a directory
/// whose files are the secret's keys, so the name must be usable as a single path component.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretName(String);

impl SecretName {
    pub fn new<S: Into<String>>(name: S) -> crate::Result<Self> {
        let name = name.into();
        if let Some(reason) = invalid_reason(&name) {
            return Err(error::InvalidSecretNameSnafu { name, reason }.build().into());
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid_reason(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("name is empty".into());
    }
    if name.len() > MAX_SECRET_NAME_LEN {
        return Some(format!("longer than {} characters", MAX_SECRET_NAME_LEN));
    }
    if name.starts_with('.') {
        return Some("name may not begin with '.'".into());
    }
    name.chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .map(|c| format!("character '{}' is not allowed", c))
}

impl Display for SecretName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for SecretName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for SecretName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for SecretName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<SecretName> for String {
    fn from(name: SecretName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod test {
    use super::SecretName;

    #[test]
    fn accepts_path_component_names() {
        assert_eq!(
            SecretName::new("vcenter-creds_01").unwrap().as_str(),
            "vcenter-creds_01"
        );
    }

    #[test]
    fn rejects_names_that_escape_the_secrets_directory() {
        assert!(SecretName::new("").is_err());
        assert!(SecretName::new("..").is_err());
        assert!(SecretName::new("a/b").is_err());
        assert!(SecretName::new(".hidden").is_err());
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<SecretName>(r#""ok-name""#).is_ok());
        assert!(serde_json::from_str::<SecretName>(r#""not ok""#).is_err());
    }
}
