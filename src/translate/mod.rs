pub mod adapter;
pub mod argos;

pub use adapter::{TranslatorAdapter, TranslatorState};
pub use argos::{ArgosRegistry, ArgosTranslator};

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Source and target language codes of the one supported translation direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub from: String,
    pub to: String,
}

impl LanguagePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// English to Thai.
    pub fn en_th() -> Self {
        Self::new("en", "th")
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::en_th()
    }
}

impl std::fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}→{}", self.from, self.to)
    }
}

/// An installable translation package from the remote index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguagePackage {
    pub from_code: String,
    pub to_code: String,
    #[serde(default)]
    pub package_version: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl LanguagePackage {
    pub fn matches(&self, pair: &LanguagePair) -> bool {
        self.from_code == pair.from && self.to_code == pair.to
    }
}

/// A working text-to-text translation capability.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Where installed languages are looked up and missing ones installed from.
#[async_trait]
pub trait LanguageRegistry: Send + Sync {
    /// Codes of every language with an installed package.
    async fn installed_languages(&self) -> Result<Vec<String>>;
    /// Packages offered by the remote index.
    async fn available_packages(&self) -> Result<Vec<LanguagePackage>>;
    async fn install(&self, package: &LanguagePackage) -> Result<()>;
    /// Capability for `pair`; only called once both languages are installed.
    fn translator(&self, pair: &LanguagePair) -> Result<Box<dyn Translator>>;
}
