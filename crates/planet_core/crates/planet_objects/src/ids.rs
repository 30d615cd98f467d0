// ids.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Namespace every generated planet ID lives under.
pub const PLANET_NAMESPACE: &str = "stellar";

/// Number of sequential planets that share one artifact group directory.
pub const PLANETS_PER_GROUP: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("planet id '{0}' is missing a namespace separator")]
    MissingNamespace(String),
    #[error("planet id '{0}' has an empty namespace or path")]
    EmptySegment(String),
}

/// Namespaced planet identity, e.g. `stellar:planet_007`.
///
/// IDs are handed out by the registry counter and are never reused; the
/// numeric suffix doubles as the sequence number used for artifact sharding.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanetId(String);

impl PlanetId {
    pub fn from_sequence(sequence: u32) -> Self {
        Self(format!("{}:planet_{:03}", PLANET_NAMESPACE, sequence))
    }

    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let (namespace, path) = raw
            .split_once(':')
            .ok_or_else(|| IdError::MissingNamespace(raw.to_string()))?;
        if namespace.is_empty() || path.is_empty() {
            return Err(IdError::EmptySegment(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or("")
    }

    /// Path segment after the namespace (`planet_007`); file names derive from it.
    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, path)| path).unwrap_or(&self.0)
    }

    /// Numeric suffix of `planet_NNN`, if the ID follows the generated format.
    pub fn sequence(&self) -> Option<u32> {
        self.path()
            .rsplit_once('_')
            .and_then(|(_, digits)| digits.parse().ok())
    }

    /// Artifact group index: `floor(sequence / 20)`. Unparseable IDs land in group 0.
    pub fn group(&self) -> u32 {
        self.sequence().unwrap_or(0) / PLANETS_PER_GROUP
    }
}

impl fmt::Display for PlanetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_format() {
        let id = PlanetId::from_sequence(7);
        assert_eq!(id.as_str(), "stellar:planet_007");
        assert_eq!(id.namespace(), "stellar");
        assert_eq!(id.path(), "planet_007");
        assert_eq!(id.sequence(), Some(7));
    }

    #[test]
    fn test_group_boundaries() {
        assert_eq!(PlanetId::from_sequence(1).group(), 0);
        assert_eq!(PlanetId::from_sequence(19).group(), 0);
        assert_eq!(PlanetId::from_sequence(20).group(), 1);
        assert_eq!(PlanetId::from_sequence(41).group(), 2);
        assert_eq!(PlanetId::from_sequence(1234).sequence(), Some(1234));
    }

    #[test]
    fn test_parse_rejects_bad_ids() {
        assert!(PlanetId::parse("planet_001").is_err());
        assert!(PlanetId::parse(":planet_001").is_err());
        assert!(PlanetId::parse("stellar:").is_err());

        let custom = PlanetId::parse("other:homeworld").unwrap();
        assert_eq!(custom.sequence(), None);
        assert_eq!(custom.group(), 0);
    }
}
