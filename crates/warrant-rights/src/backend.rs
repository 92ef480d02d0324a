//! Authorization backends.
//!
//! The evaluator itself is stateless; these types decide where the rule set
//! comes from and how often it is read.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RightsError, RightsResult};
use crate::evaluator::authorize;
use crate::permissions::Permissions;
use crate::rule::RuleSet;

/// Something that can answer authorization questions.
pub trait Authorizer: Send + Sync {
    /// Return the subset of `requested` that `identity` holds on `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`RightsError`] if the rules cannot be loaded or a reached
    /// rule cannot be evaluated.
    fn authorized(
        &self,
        identity: Option<&str>,
        path: &str,
        requested: &Permissions,
    ) -> RightsResult<Permissions>;
}

/// When a file-backed rule set is re-read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReloadPolicy {
    /// Re-read the file for every decision.
    #[default]
    Always,
    /// Re-read only when the file's modification time or size changes.
    OnChange,
}

impl fmt::Display for ReloadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::OnChange => write!(f, "on_change"),
        }
    }
}

impl FromStr for ReloadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always" => Ok(Self::Always),
            "on_change" => Ok(Self::OnChange),
            other => Err(format!(
                "unknown reload policy '{other}'; expected 'always' or 'on_change'"
            )),
        }
    }
}

/// Build the backend for a rule file under the given reload policy.
#[must_use]
pub fn open_backend(path: impl Into<PathBuf>, policy: ReloadPolicy) -> Box<dyn Authorizer> {
    let path = path.into();
    info!(path = %path.display(), reload = %policy, "using rights file");
    match policy {
        ReloadPolicy::Always => Box::new(RulesFile::new(path)),
        ReloadPolicy::OnChange => Box::new(CachedRulesFile::new(path)),
    }
}

/// Evaluates a fixed, in-memory rule set.
#[derive(Debug, Clone)]
pub struct StaticRules {
    rules: Arc<RuleSet>,
}

impl StaticRules {
    /// Pin `rules` for every decision.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// The pinned rule set.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Authorizer for StaticRules {
    fn authorized(
        &self,
        identity: Option<&str>,
        path: &str,
        requested: &Permissions,
    ) -> RightsResult<Permissions> {
        authorize(identity, path, requested, &self.rules)
    }
}

/// Reads the rule file afresh for every decision, so edits apply at once.
#[derive(Debug, Clone)]
pub struct RulesFile {
    path: PathBuf,
}

impl RulesFile {
    /// Use the rule file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the rule file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Authorizer for RulesFile {
    fn authorized(
        &self,
        identity: Option<&str>,
        path: &str,
        requested: &Permissions,
    ) -> RightsResult<Permissions> {
        let rules = RuleSet::load(&self.path)?;
        authorize(identity, path, requested, &rules)
    }
}

/// Identifies one version of a file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn read(path: &Path) -> RightsResult<Self> {
        let metadata = std::fs::metadata(path).map_err(|source| RightsError::Load {
            origin: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

#[derive(Debug)]
struct Snapshot {
    stamp: FileStamp,
    rules: Arc<RuleSet>,
}

/// Keeps the parsed rule file and re-reads it only when it changes on disk.
///
/// A file without a usable modification time is re-read whenever its size
/// differs, so prefer [`RulesFile`] on such filesystems.
#[derive(Debug)]
pub struct CachedRulesFile {
    path: PathBuf,
    snapshot: RwLock<Option<Snapshot>>,
}

impl CachedRulesFile {
    /// Use the rule file at `path`; nothing is read until the first decision.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: RwLock::new(None),
        }
    }

    /// Location of the rule file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current rule set, reloading it if the file changed.
    ///
    /// The file is parsed without holding the lock; concurrent callers that
    /// observe the same change may each parse it once.
    ///
    /// # Errors
    ///
    /// Returns [`RightsError::Load`] if the file cannot be read, or a
    /// rule-definition error if it no longer parses. A failed reload leaves
    /// the previous snapshot in place but is still reported.
    pub fn rules(&self) -> RightsResult<Arc<RuleSet>> {
        let stamp = FileStamp::read(&self.path)?;

        if let Ok(guard) = self.snapshot.read()
            && let Some(snapshot) = guard.as_ref()
            && snapshot.stamp == stamp
        {
            return Ok(Arc::clone(&snapshot.rules));
        }

        let rules = Arc::new(RuleSet::load(&self.path)?);
        debug!(path = %self.path.display(), rules = rules.len(), "rights file reloaded");

        match self.snapshot.write() {
            Ok(mut guard) => {
                *guard = Some(Snapshot {
                    stamp,
                    rules: Arc::clone(&rules),
                });
            },
            Err(poisoned) => {
                *poisoned.into_inner() = Some(Snapshot {
                    stamp,
                    rules: Arc::clone(&rules),
                });
            },
        }

        Ok(rules)
    }
}

impl Authorizer for CachedRulesFile {
    fn authorized(
        &self,
        identity: Option<&str>,
        path: &str,
        requested: &Permissions,
    ) -> RightsResult<Permissions> {
        let rules = self.rules()?;
        authorize(identity, path, requested, &rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER_RULES: &str = "[owner]\nuser = (.+)\ncollection = {0}(/.*)?\npermissions = rw\n";

    #[test]
    fn test_reload_policy_round_trip() {
        for policy in [ReloadPolicy::Always, ReloadPolicy::OnChange] {
            assert_eq!(policy.to_string().parse::<ReloadPolicy>().unwrap(), policy);
        }
        assert!("sometimes".parse::<ReloadPolicy>().is_err());
        assert_eq!(ReloadPolicy::default(), ReloadPolicy::Always);
    }

    #[test]
    fn test_static_rules() {
        let backend = StaticRules::new(RuleSet::parse("<test>", OWNER_RULES).unwrap());
        let granted = backend
            .authorized(Some("alice"), "/alice/cal/", &Permissions::parse("rw"))
            .unwrap();
        assert_eq!(granted.to_string(), "rw");
        assert_eq!(backend.rules().len(), 1);
    }

    #[test]
    fn test_rules_file_sees_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rights");
        std::fs::write(&path, OWNER_RULES).unwrap();

        let backend = RulesFile::new(&path);
        let requested = Permissions::parse("rw");
        assert_eq!(
            backend.authorized(Some("alice"), "alice", &requested).unwrap(),
            requested
        );

        std::fs::write(&path, "").unwrap();
        assert!(
            backend
                .authorized(Some("alice"), "alice", &requested)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_rules_file_missing() {
        let backend = RulesFile::new("/nonexistent/rights");
        let err = backend
            .authorized(None, "x", &Permissions::parse("r"))
            .unwrap_err();
        assert!(matches!(err, RightsError::Load { .. }));
    }

    #[test]
    fn test_cached_rules_file_reuses_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rights");
        std::fs::write(&path, OWNER_RULES).unwrap();

        let backend = CachedRulesFile::new(&path);
        let first = backend.rules().unwrap();
        let second = backend.rules().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_cached_rules_file_reloads_on_size_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rights");
        std::fs::write(&path, OWNER_RULES).unwrap();

        let backend = CachedRulesFile::new(&path);
        assert_eq!(backend.rules().unwrap().len(), 1);

        let two_rules = format!("{OWNER_RULES}[public]\nuser = .*\ncollection = public\npermissions = r\n");
        std::fs::write(&path, two_rules).unwrap();
        assert_eq!(backend.rules().unwrap().len(), 2);
    }

    #[test]
    fn test_open_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rights");
        std::fs::write(&path, OWNER_RULES).unwrap();

        for policy in [ReloadPolicy::Always, ReloadPolicy::OnChange] {
            let backend = open_backend(&path, policy);
            let granted = backend
                .authorized(Some("bob"), "bob/tasks", &Permissions::parse("r"))
                .unwrap();
            assert_eq!(granted.to_string(), "r");
        }
    }
}
