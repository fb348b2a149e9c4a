//! Argos Translate as the offline translation engine.
//!
//! Installed packages are discovered from their `metadata.json` files, the
//! package index is fetched over HTTP, and installation and translation go
//! through the `argospm` and `argos-translate` command-line tools.

use crate::config::DEFAULT_PACKAGE_INDEX;
use crate::error::{BurnsubError, Result};
use crate::translate::{LanguagePackage, LanguagePair, LanguageRegistry, Translator};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct PackageMetadata {
    from_code: String,
    to_code: String,
}

/// Run an argos tool and return its stdout; every failure is a translation error.
fn run_argos(command: &mut Command) -> Result<String> {
    let tool = command.get_program().to_string_lossy().into_owned();

    let output = command.output().map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            BurnsubError::Translation(format!("{tool} is not installed"))
        } else {
            BurnsubError::Translation(format!("Failed to run {tool}: {e}"))
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BurnsubError::Translation(format!(
            "{tool} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub struct ArgosRegistry {
    client: Client,
    index_url: String,
    packages_dir: Option<PathBuf>,
    argospm: String,
    translate_binary: String,
}

impl Default for ArgosRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ArgosRegistry {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            index_url: DEFAULT_PACKAGE_INDEX.to_string(),
            packages_dir: Self::default_packages_dir(),
            argospm: "argospm".to_string(),
            translate_binary: "argos-translate".to_string(),
        }
    }

    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = url.into();
        self
    }

    pub fn with_packages_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.packages_dir = Some(dir.into());
        self
    }

    /// `$ARGOS_PACKAGES_DIR`, else argos' own location under the user data dir.
    pub fn default_packages_dir() -> Option<PathBuf> {
        std::env::var_os("ARGOS_PACKAGES_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|d| d.join("argos-translate").join("packages")))
    }

    async fn read_metadata(path: &Path) -> Option<PackageMetadata> {
        let body = fs::read_to_string(path).await.ok()?;
        match serde_json::from_str(&body) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                debug!("Ignoring unreadable package metadata {:?}: {}", path, e);
                None
            }
        }
    }
}

#[async_trait]
impl LanguageRegistry for ArgosRegistry {
    async fn installed_languages(&self) -> Result<Vec<String>> {
        let Some(ref dir) = self.packages_dir else {
            return Ok(Vec::new());
        };
        if !dir.exists() {
            debug!("No argos packages directory at {:?}", dir);
            return Ok(Vec::new());
        }

        let mut codes = BTreeSet::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(metadata) = Self::read_metadata(&entry.path().join("metadata.json")).await
            {
                codes.insert(metadata.from_code);
                codes.insert(metadata.to_code);
            }
        }

        Ok(codes.into_iter().collect())
    }

    async fn available_packages(&self) -> Result<Vec<LanguagePackage>> {
        debug!("Fetching package index from {}", self.index_url);

        let packages = self
            .client
            .get(&self.index_url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<LanguagePackage>>()
            .await?;

        debug!("Package index lists {} packages", packages.len());
        Ok(packages)
    }

    async fn install(&self, package: &LanguagePackage) -> Result<()> {
        let name = format!("translate-{}_{}", package.from_code, package.to_code);
        info!(
            "Installing {} (version {})",
            name,
            package.package_version.as_deref().unwrap_or("unknown")
        );

        run_argos(Command::new(&self.argospm).arg("update"))?;
        run_argos(Command::new(&self.argospm).args(["install", name.as_str()]))?;
        Ok(())
    }

    fn translator(&self, pair: &LanguagePair) -> Result<Box<dyn Translator>> {
        Ok(Box::new(ArgosTranslator {
            binary: self.translate_binary.clone(),
            pair: pair.clone(),
        }))
    }
}

/// One `argos-translate` invocation per text.
pub struct ArgosTranslator {
    binary: String,
    pair: LanguagePair,
}

impl ArgosTranslator {
    pub fn new(binary: impl Into<String>, pair: LanguagePair) -> Self {
        Self {
            binary: binary.into(),
            pair,
        }
    }
}

#[async_trait]
impl Translator for ArgosTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        // `--` keeps text starting with a dash from being read as a flag
        let stdout = run_argos(Command::new(&self.binary).args([
            "--from-lang",
            self.pair.from.as_str(),
            "--to-lang",
            self.pair.to.as_str(),
            "--",
            text,
        ]))?;

        let translated = stdout.trim();
        if translated.is_empty() && !text.trim().is_empty() {
            return Err(BurnsubError::Translation(
                "argos-translate returned no text".to_string(),
            ));
        }
        Ok(translated.to_string())
    }

    fn name(&self) -> &'static str {
        "argos"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_installed_languages_from_metadata() {
        let dir = tempfile::tempdir().unwrap();
        for (name, from, to) in [("translate-en_th", "en", "th"), ("translate-en_de", "en", "de")] {
            let pkg = dir.path().join(name);
            std::fs::create_dir(&pkg).unwrap();
            std::fs::write(
                pkg.join("metadata.json"),
                format!(r#"{{"package_version": "1.0", "from_code": "{from}", "to_code": "{to}"}}"#),
            )
            .unwrap();
        }
        // Junk next to the packages is ignored
        std::fs::create_dir(dir.path().join("broken")).unwrap();
        std::fs::write(dir.path().join("broken").join("metadata.json"), "{").unwrap();

        let registry = ArgosRegistry::new().with_packages_dir(dir.path());
        let languages = registry.installed_languages().await.unwrap();

        assert_eq!(languages, vec!["de", "en", "th"]);
    }

    #[tokio::test]
    async fn test_missing_packages_dir_is_empty() {
        let registry = ArgosRegistry::new().with_packages_dir("/nonexistent/argos/packages");
        assert!(registry.installed_languages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_translate_binary_is_translation_error() {
        let translator = ArgosTranslator::new("burnsub-no-such-argos", LanguagePair::en_th());
        let err = translator.translate("hello").await.unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_package_matching() {
        let package: LanguagePackage = serde_json::from_str(
            r#"{"from_code": "en", "to_code": "th", "package_version": "1.9", "links": ["https://example.com/en_th.argosmodel"]}"#,
        )
        .unwrap();
        assert!(package.matches(&LanguagePair::en_th()));
        assert!(!package.matches(&LanguagePair::new("th", "en")));
    }
}
