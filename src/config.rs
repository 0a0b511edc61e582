//! Conversion options shared by the library entry points and the CLI.

use tracing::warn;

/// Environment variable selecting the [`PlacesPolicy`].
pub const PLACES_ENV_VAR: &str = "NOSE2PYTEST_PLACES";

/// What to do with a rounding-precision argument (`places`) of the tolerance family.
///
/// A precision compares rounded values, which no absolute bound reproduces exactly, so converting it is
/// opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacesPolicy {
    /// Leave the call unconverted and report it.
    #[default]
    Skip,
    /// Convert `places=N` to the absolute bound `1e-N`.
    Tolerance,
}

impl PlacesPolicy {
    /// Resolve the policy from the environment or an explicit option
    ///
    /// Checks in order:
    /// 1. Environment variable NOSE2PYTEST_PLACES
    /// 2. Explicit option (e.g. the `--places` flag)
    /// 3. Falls back to [`PlacesPolicy::Skip`]
    pub fn from_env_or_default(option: Option<&str>) -> Self {
        if let Ok(value) = std::env::var(PLACES_ENV_VAR) {
            return Self::parse(&value);
        }

        if let Some(value) = option {
            return Self::parse(value);
        }

        Self::default()
    }

    /// Parse a policy name
    ///
    /// Format:
    /// - "skip" -> leave precision calls alone
    /// - "tolerance" -> convert precision to an absolute bound
    ///
    /// Unknown names fall back to the default with a warning.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "skip" => Self::Skip,
            "tolerance" => Self::Tolerance,
            other => {
                warn!("Unknown places policy '{}', using 'skip'", other);
                Self::Skip
            }
        }
    }
}

/// Options for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub places: PlacesPolicy,
    /// Overwrite changed files; `false` only reports what would change.
    pub write: bool,
    /// Worker threads; `None` uses the rayon default.
    pub jobs: Option<usize>,
    /// File extensions picked up when walking directories.
    pub extensions: Vec<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            places: PlacesPolicy::default(),
            write: true,
            jobs: None,
            extensions: vec!["py".to_string()],
        }
    }
}

impl ConvertOptions {
    /// Options that never touch the filesystem.
    pub fn dry_run() -> Self {
        ConvertOptions { write: false, ..Self::default() }
    }

    pub fn with_places(mut self, places: PlacesPolicy) -> Self {
        self.places = places;
        self
    }
}
