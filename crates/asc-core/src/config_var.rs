//! Conditional-compilation configuration variables (`NS::name=value`).

use std::fmt;
use std::str::FromStr;

use crate::ConfigVarError;

/// A configuration constant such as `CONFIG::debug=true`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigVar {
    pub namespace: String,
    pub name: String,
    pub value: String,
}

impl ConfigVar {
    /// Parse `NS::name=value`.
    ///
    /// The value is everything after the first `=` and may itself contain `=`.
    pub fn parse(text: &str) -> Result<Self, ConfigVarError> {
        let (namespace, rest) = text
            .split_once("::")
            .ok_or_else(|| ConfigVarError::MissingNamespace(text.to_string()))?;
        let (name, value) = rest
            .split_once('=')
            .ok_or_else(|| ConfigVarError::MissingValue(text.to_string()))?;
        if namespace.is_empty() || name.is_empty() {
            return Err(ConfigVarError::EmptyName(text.to_string()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

impl FromStr for ConfigVar {
    type Err = ConfigVarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfigVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}={}", self.namespace, self.name, self.value)
    }
}
