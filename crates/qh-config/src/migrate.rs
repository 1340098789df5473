//! Schema version handling and the migration registry.
//!
//! Config versions are `MAJOR.MINOR`. Versions newer than the supported
//! one are rejected at load time. Older versions walk the registry; when
//! no migration is registered for a version, the version is simply bumped.

use qh_core::QualhookError;

/// Schema version this binary reads and writes.
pub const SUPPORTED_VERSION: Version = Version::new(1, 0);

/// Transformation applied to the raw JSON document.
pub type MigrateFn = Box<dyn Fn(&mut serde_json::Value) -> Result<(), QualhookError> + Send + Sync>;

/// `MAJOR.MINOR` schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse a version string and reject anything newer than
    /// [`SUPPORTED_VERSION`].
    pub fn parse_supported(s: &str) -> Result<Self, QualhookError> {
        let version: Self = s.parse()?;
        if version > SUPPORTED_VERSION {
            return Err(QualhookError::ConfigInvalid(format!(
                "config version {version} is newer than the supported {SUPPORTED_VERSION}"
            )));
        }
        Ok(version)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = QualhookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 2 {
            return Err(QualhookError::ConfigInvalid(format!(
                "invalid version format: expected MAJOR.MINOR, got {s:?}"
            )));
        }
        let parse = |part: &str| {
            part.parse::<u32>().map_err(|_| {
                QualhookError::ConfigInvalid(format!("invalid version component {part:?} in {s:?}"))
            })
        };
        Ok(Self {
            major: parse(parts[0])?,
            minor: parse(parts[1])?,
        })
    }
}

/// A single schema migration between adjacent versions.
pub struct Migration {
    pub from: Version,
    pub to: Version,
    pub description: String,
    pub apply: MigrateFn,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("description", &self.description)
            .finish()
    }
}

/// Registry of known migrations, ordered by `from` version.
#[derive(Default)]
pub struct MigrationRegistry {
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a migration, keeping the list ordered by `from`.
    pub fn register(&mut self, migration: Migration) {
        let at = self
            .migrations
            .partition_point(|m| m.from <= migration.from);
        self.migrations.insert(at, migration);
    }

    fn find_from(&self, version: Version) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.from == version)
    }

    /// Bring a raw config document up to [`SUPPORTED_VERSION`].
    ///
    /// Applies registered migrations step by step; versions with no
    /// registered migration are bumped directly.
    pub fn migrate_to_current(&self, value: &mut serde_json::Value) -> Result<(), QualhookError> {
        let version_str = value
            .get("version")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                QualhookError::ConfigInvalid("config is missing the \"version\" field".into())
            })?;
        let mut version = Version::parse_supported(version_str)?;

        while version < SUPPORTED_VERSION {
            match self.find_from(version) {
                Some(migration) => {
                    tracing::debug!(
                        from = %migration.from,
                        to = %migration.to,
                        "applying config migration: {}",
                        migration.description
                    );
                    (migration.apply)(value)?;
                    version = migration.to;
                }
                None => version = SUPPORTED_VERSION,
            }
            value["version"] = serde_json::Value::String(version.to_string());
        }
        Ok(())
    }
}

/// Registry shipped with this binary. No migrations exist yet for the
/// `1.0` schema.
pub fn default_registry() -> MigrationRegistry {
    MigrationRegistry::new()
}
