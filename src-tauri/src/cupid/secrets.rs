use super::types::Credential;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GOOGLE_API_KEY", default)]
    google_api_key: Option<String>,
}

/// Where a stored key came from, for the window's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretSource {
    Environment,
    File,
}

/// Managed secret store: environment first, then `secrets.toml`.
#[derive(Debug, Default)]
pub struct SecretStore {
    stored: Option<(Credential, SecretSource)>,
}

/// `<config dir>/cupid/secrets.toml`
pub fn default_secrets_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cupid").join("secrets.toml"))
}

impl SecretStore {
    pub fn load() -> Self {
        let env = std::env::var(API_KEY_VAR).ok();
        Self::from_sources(env.as_deref(), default_secrets_path().as_deref())
    }

    pub fn from_sources(env_value: Option<&str>, file: Option<&Path>) -> Self {
        if let Some(c) = env_value.and_then(Credential::new) {
            return Self {
                stored: Some((c, SecretSource::Environment)),
            };
        }

        let from_file = file
            .and_then(read_secrets_file)
            .and_then(|s| s.google_api_key)
            .and_then(|k| Credential::new(&k));

        Self {
            stored: from_file.map(|c| (c, SecretSource::File)),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.stored.as_ref().map(|(c, _)| c)
    }

    pub fn source(&self) -> Option<SecretSource> {
        self.stored.as_ref().map(|(_, s)| *s)
    }
}

fn read_secrets_file(path: &Path) -> Option<SecretsFile> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read secrets file");
            return None;
        }
    };

    match toml::from_str::<SecretsFile>(&contents) {
        Ok(s) => Some(s),
        Err(e) => {
            // toml errors quote the offending line, which may hold the key
            tracing::warn!(
                path = %path.display(),
                line = ?e.span(),
                "Failed to parse secrets file"
            );
            None
        }
    }
}

/// Stored key wins; the typed key is the fallback.
pub fn resolve_credential(stored: Option<&Credential>, typed: Option<&str>) -> Option<Credential> {
    stored
        .cloned()
        .or_else(|| typed.and_then(Credential::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn secrets_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn environment_wins_over_file() {
        let f = secrets_file("GOOGLE_API_KEY = \"from-file\"\n");
        let store = SecretStore::from_sources(Some("from-env"), Some(f.path()));
        assert_eq!(store.credential().unwrap().expose(), "from-env");
        assert_eq!(store.source(), Some(SecretSource::Environment));
    }

    #[test]
    fn blank_environment_falls_through_to_file() {
        let f = secrets_file("GOOGLE_API_KEY = \"  from-file \"\n");
        let store = SecretStore::from_sources(Some("   "), Some(f.path()));
        assert_eq!(store.credential().unwrap().expose(), "from-file");
        assert_eq!(store.source(), Some(SecretSource::File));
    }

    #[test]
    fn missing_or_broken_file_means_no_secret() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("secrets.toml");
        assert!(SecretStore::from_sources(None, Some(&missing)).credential().is_none());

        let broken = secrets_file("GOOGLE_API_KEY = ");
        assert!(SecretStore::from_sources(None, Some(broken.path())).credential().is_none());

        let other = secrets_file("OTHER = \"x\"\n");
        assert!(SecretStore::from_sources(None, Some(other.path())).credential().is_none());

        assert!(SecretStore::from_sources(None, None).source().is_none());
    }

    #[test]
    fn stored_key_is_preferred_over_typed() {
        let stored = Credential::new("stored");
        let got = resolve_credential(stored.as_ref(), Some("typed")).unwrap();
        assert_eq!(got.expose(), "stored");
    }

    #[test]
    fn typed_key_is_fallback() {
        assert_eq!(resolve_credential(None, Some(" typed ")).unwrap().expose(), "typed");
        assert!(resolve_credential(None, Some("  ")).is_none());
        assert!(resolve_credential(None, None).is_none());
    }
}
