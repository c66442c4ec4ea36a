//! Embedded set catalog
//!
//! The catalog lists every display code an operator may select and carries
//! the override pair table used to build the default [`CodeResolver`].

pub mod resolver;

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;

pub use resolver::CodeResolver;

/// Embedded catalog data
const CATALOG_JSON: &str = include_str!("sets.json");

/// Global catalog instance (loaded once)
static CATALOG: Lazy<Result<SetCatalog, CatalogError>> =
    Lazy::new(|| SetCatalog::from_json(CATALOG_JSON));

/// Catalog and resolver errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Embedded document could not be parsed
    #[error("catalog parse error: {0}")]
    ParseError(String),

    /// Two override pairs reuse the same display code
    #[error("duplicate display code in override table: {0}")]
    DuplicateDisplayCode(String),

    /// Two override pairs reuse the same remote code
    #[error("duplicate remote code in override table: {0}")]
    DuplicateRemoteCode(String),

    /// Code not present in the catalog
    #[error("unknown set code: {0}")]
    UnknownSet(String),
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    schema_version: String,
    sets: Vec<String>,
    overrides: Vec<RawOverride>,
}

#[derive(Debug, Deserialize)]
struct RawOverride {
    display: String,
    remote: String,
}

/// Selectable set codes plus the display/remote override table
#[derive(Debug, Clone)]
pub struct SetCatalog {
    schema_version: String,
    sets: Vec<String>,
    index: HashSet<String>,
    overrides: Vec<(String, String)>,
}

impl SetCatalog {
    /// Load the embedded catalog
    ///
    /// The document is parsed once and cached for the process lifetime.
    pub fn load() -> Result<&'static Self, &'static CatalogError> {
        CATALOG.as_ref()
    }

    /// Parse a catalog from a JSON document
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)
            .map_err(|e| CatalogError::ParseError(format!("Failed to parse catalog: {e}")))?;

        let mut index = HashSet::with_capacity(raw.sets.len());
        let mut sets = Vec::with_capacity(raw.sets.len());
        for code in raw.sets {
            let code = code.trim().to_uppercase();
            if code.is_empty() {
                return Err(CatalogError::ParseError(
                    "Catalog contains an empty set code".to_string(),
                ));
            }
            if index.insert(code.clone()) {
                sets.push(code);
            }
        }

        let overrides = raw
            .overrides
            .into_iter()
            .map(|o| (o.display, o.remote))
            .collect();

        Ok(Self {
            schema_version: raw.schema_version,
            sets,
            index,
            overrides,
        })
    }

    /// Catalog document schema version
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// All selectable display codes in catalog order
    pub fn list(&self) -> &[String] {
        &self.sets
    }

    /// Whether a display code is in the catalog (case-insensitive)
    pub fn contains(&self, code: &str) -> bool {
        self.index.contains(&code.trim().to_uppercase())
    }

    /// Validate a display code against the catalog
    pub fn validate(&self, code: &str) -> Result<(), CatalogError> {
        if self.contains(code) {
            Ok(())
        } else {
            Err(CatalogError::UnknownSet(code.trim().to_uppercase()))
        }
    }

    /// Codes containing `pattern` as a case-insensitive substring
    ///
    /// An empty pattern matches everything.
    pub fn filter(&self, pattern: &str) -> Vec<&str> {
        let needle = pattern.trim().to_uppercase();
        self.sets
            .iter()
            .filter(|code| code.contains(&needle))
            .map(String::as_str)
            .collect()
    }

    /// Display/remote override pairs
    pub fn overrides(&self) -> &[(String, String)] {
        &self.overrides
    }

    /// Build a resolver from this catalog's override table
    pub fn resolver(&self) -> Result<CodeResolver, CatalogError> {
        CodeResolver::from_pairs(&self.overrides)
    }
}
