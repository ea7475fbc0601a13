use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use concierge_collaborators::{
    ConfigError, MemoryNotifier, MemoryStore, Notifier, RecordStore, ResendConfig,
    SupabaseConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reference::{DEFAULT_PREFIX, ReferenceGenerator};

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_RESEND_KEY: &str = "RESEND_API_KEY";
pub const ENV_RESEND_FROM: &str = "RESEND_FROM";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Collaborator(#[from] ConfigError),
    #[error("{0} is configured but this build has no http support")]
    HttpDisabled(&'static str),
}

/// How submissions are carried out, independent of which collaborators run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Upper bound for each collaborator call. Unbounded when unset.
    pub collaborator_timeout_secs: Option<u64>,
    pub reference_prefix: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            collaborator_timeout_secs: None,
            reference_prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl SubmissionConfig {
    pub fn collaborator_timeout(&self) -> Option<Duration> {
        self.collaborator_timeout_secs.map(Duration::from_secs)
    }

    pub fn reference_generator(&self) -> ReferenceGenerator {
        ReferenceGenerator::new(self.reference_prefix.clone())
    }
}

/// Everything the wizard's collaborators need. A missing section means the
/// in-memory stand-in is used instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConciergeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supabase: Option<SupabaseConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resend: Option<ResendConfig>,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

impl ConciergeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the collaborator credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let supabase = match (var(ENV_SUPABASE_URL), var(ENV_SUPABASE_KEY)) {
            (Some(url), Some(key)) => Some(SupabaseConfig::new(url, key)),
            _ => None,
        };
        let resend = match (var(ENV_RESEND_KEY), var(ENV_RESEND_FROM)) {
            (Some(key), Some(from)) => Some(ResendConfig::new(key, from)),
            _ => None,
        };
        Self {
            supabase,
            resend,
            submission: SubmissionConfig::default(),
        }
    }

    /// True when neither remote collaborator is configured.
    pub fn is_dry_run(&self) -> bool {
        self.supabase.is_none() && self.resend.is_none()
    }

    pub fn record_store(&self) -> Result<Arc<dyn RecordStore>, ConfigLoadError> {
        match &self.supabase {
            None => Ok(Arc::new(MemoryStore::new())),
            #[cfg(feature = "http")]
            Some(config) => Ok(Arc::new(concierge_collaborators::SupabaseStore::new(config)?)),
            #[cfg(not(feature = "http"))]
            Some(_) => Err(ConfigLoadError::HttpDisabled("supabase")),
        }
    }

    pub fn notifier(&self) -> Result<Arc<dyn Notifier>, ConfigLoadError> {
        match &self.resend {
            None => Ok(Arc::new(MemoryNotifier::new())),
            #[cfg(feature = "http")]
            Some(config) => Ok(Arc::new(concierge_collaborators::ResendNotifier::new(config)?)),
            #[cfg(not(feature = "http"))]
            Some(_) => Err(ConfigLoadError::HttpDisabled("resend")),
        }
    }
}
