//! Bidirectional display/remote set code mapping

use super::CatalogError;
use std::collections::HashMap;

/// Translates between operator-facing display codes and remote API codes
///
/// Both direction maps are derived from one list of override pairs, so for
/// every registered pair `(d, r)`:
/// `to_remote_code(d) == r` and `to_display_code(r) == d`.
/// Codes without an override map to themselves, uppercased.
#[derive(Debug, Clone, Default)]
pub struct CodeResolver {
    display_to_remote: HashMap<String, String>,
    remote_to_display: HashMap<String, String>,
}

impl CodeResolver {
    /// Resolver with no overrides (identity mapping)
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build a resolver from `(display, remote)` pairs
    ///
    /// # Errors
    /// Returns an error when two pairs share a display code or a remote code.
    pub fn from_pairs<D, R>(pairs: &[(D, R)]) -> Result<Self, CatalogError>
    where
        D: AsRef<str>,
        R: AsRef<str>,
    {
        let mut display_to_remote = HashMap::with_capacity(pairs.len());
        let mut remote_to_display = HashMap::with_capacity(pairs.len());

        for (display, remote) in pairs {
            let display = normalize(display.as_ref());
            let remote = normalize(remote.as_ref());

            if display_to_remote.contains_key(&display) {
                return Err(CatalogError::DuplicateDisplayCode(display));
            }
            if remote_to_display.contains_key(&remote) {
                return Err(CatalogError::DuplicateRemoteCode(remote));
            }

            display_to_remote.insert(display.clone(), remote.clone());
            remote_to_display.insert(remote, display);
        }

        Ok(Self {
            display_to_remote,
            remote_to_display,
        })
    }

    /// Remote API code for a display code
    pub fn to_remote_code(&self, display: &str) -> String {
        let key = normalize(display);
        match self.display_to_remote.get(&key) {
            Some(remote) => remote.clone(),
            None => key,
        }
    }

    /// Display code for a remote API code
    pub fn to_display_code(&self, remote: &str) -> String {
        let key = normalize(remote);
        match self.remote_to_display.get(&key) {
            Some(display) => display.clone(),
            None => key,
        }
    }

    /// Number of registered override pairs
    pub fn len(&self) -> usize {
        self.display_to_remote.len()
    }

    /// Whether no overrides are registered
    pub fn is_empty(&self) -> bool {
        self.display_to_remote.is_empty()
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}
