//! Lazily initialised translator that degrades to passthrough.
//!
//! The adapter resolves its capability on first use. Once it is `Ready` or
//! `Unavailable` it stays that way for the life of the adapter. Translation
//! never fails from the caller's point of view: errors are logged and the
//! original text is returned.

use crate::error::{BurnsubError, Result};
use crate::translate::{LanguagePair, LanguageRegistry, Translator};
use tracing::{debug, info, warn};

/// Observable lifecycle of a [`TranslatorAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorState {
    Uninitialized,
    Ready,
    Unavailable,
}

impl std::fmt::Display for TranslatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslatorState::Uninitialized => write!(f, "uninitialized"),
            TranslatorState::Ready => write!(f, "ready"),
            TranslatorState::Unavailable => write!(f, "unavailable"),
        }
    }
}

enum Lifecycle {
    Uninitialized,
    Ready(Box<dyn Translator>),
    Unavailable,
}

pub struct TranslatorAdapter {
    registry: Box<dyn LanguageRegistry>,
    pair: LanguagePair,
    lifecycle: Lifecycle,
    failures: usize,
}

impl TranslatorAdapter {
    pub fn new(registry: Box<dyn LanguageRegistry>, pair: LanguagePair) -> Self {
        Self {
            registry,
            pair,
            lifecycle: Lifecycle::Uninitialized,
            failures: 0,
        }
    }

    pub fn state(&self) -> TranslatorState {
        match self.lifecycle {
            Lifecycle::Uninitialized => TranslatorState::Uninitialized,
            Lifecycle::Ready(_) => TranslatorState::Ready,
            Lifecycle::Unavailable => TranslatorState::Unavailable,
        }
    }

    pub fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    /// Number of texts that fell back to the original because translation failed.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Resolve the capability if that has not been attempted yet.
    pub async fn initialize(&mut self) -> TranslatorState {
        if let Lifecycle::Uninitialized = self.lifecycle {
            self.lifecycle = match self.resolve().await {
                Ok(translator) => {
                    info!("Translator ready: {} ({})", self.pair, translator.name());
                    Lifecycle::Ready(translator)
                }
                Err(e) => {
                    warn!(
                        "Translator unavailable for {}, subtitles stay untranslated: {}",
                        self.pair, e
                    );
                    Lifecycle::Unavailable
                }
            };
        }
        self.state()
    }

    fn has_pair(&self, installed: &[String]) -> bool {
        installed.iter().any(|code| *code == self.pair.from)
            && installed.iter().any(|code| *code == self.pair.to)
    }

    async fn resolve(&self) -> Result<Box<dyn Translator>> {
        let installed = self.registry.installed_languages().await?;
        debug!("Installed languages: {:?}", installed);

        if !self.has_pair(&installed) {
            info!("Installing translation package {}", self.pair);

            let package = self
                .registry
                .available_packages()
                .await?
                .into_iter()
                .find(|p| p.matches(&self.pair))
                .ok_or_else(|| {
                    BurnsubError::Translation(format!(
                        "No package for {} in the package index",
                        self.pair
                    ))
                })?;

            self.registry.install(&package).await?;

            let installed = self.registry.installed_languages().await?;
            if !self.has_pair(&installed) {
                return Err(BurnsubError::Translation(format!(
                    "{} still missing after installing the package",
                    self.pair
                )));
            }
        }

        self.registry.translator(&self.pair)
    }

    /// Translate `text`, or return it unchanged if that is not possible.
    pub async fn translate(&mut self, text: &str) -> String {
        self.initialize().await;

        match &self.lifecycle {
            Lifecycle::Ready(translator) => match translator.translate(text).await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!("Translation failed: {} → {}", text, e);
                    self.failures += 1;
                    text.to_string()
                }
            },
            Lifecycle::Uninitialized | Lifecycle::Unavailable => text.to_string(),
        }
    }
}
