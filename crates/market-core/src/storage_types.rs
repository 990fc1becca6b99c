use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Each variant names one registered storage strategy. The string form is the
/// strategy name used by configuration and the storage control endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    Local,
    ObjectStore,
}

impl StorageBackend {
    pub const ALL: [StorageBackend; 2] = [StorageBackend::Local, StorageBackend::ObjectStore];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Local => "local",
            StorageBackend::ObjectStore => "object-store",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "object-store" => Ok(StorageBackend::ObjectStore),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for backend in StorageBackend::ALL {
            assert_eq!(backend.as_str().parse::<StorageBackend>().unwrap(), backend);
        }
        assert_eq!(
            " Object-Store ".parse::<StorageBackend>().unwrap(),
            StorageBackend::ObjectStore
        );
        assert!("aws-s3".parse::<StorageBackend>().is_err());
    }
}
