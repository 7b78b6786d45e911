use std::collections::HashSet;

use crate::common::CatalogError;

/// Ordered list of episode titles offered by the simulator for one session.
///
/// Wire format: UTF-8 titles separated by `\n` (a trailing newline and `\r\n`
/// line endings are tolerated). An empty payload is an empty catalog.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EpisodeCatalog {
    titles: Vec<String>,
}

impl EpisodeCatalog {
    pub fn parse(payload: &[u8]) -> Result<Self, CatalogError> {
        let text = std::str::from_utf8(payload).map_err(|e| CatalogError::NotUtf8(e.to_string()))?;
        let body = text.strip_suffix('\n').unwrap_or(text);
        let body = body.strip_suffix('\r').unwrap_or(body);
        if body.is_empty() {
            return Ok(Self::default());
        }

        let mut seen = HashSet::new();
        let mut titles = Vec::new();
        for (i, line) in body.split('\n').enumerate() {
            let title = line.trim();
            if title.is_empty() {
                return Err(CatalogError::EmptyTitle { line: i + 1 });
            }
            if !seen.insert(title) {
                return Err(CatalogError::DuplicateTitle {
                    title: title.to_string(),
                });
            }
            titles.push(title.to_string());
        }
        Ok(Self { titles })
    }

    /// Inverse of [`parse`](Self::parse); used by simulator stand-ins in tests.
    pub fn encode(&self) -> Vec<u8> {
        self.titles.join("\n").into_bytes()
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }
}

impl FromIterator<String> for EpisodeCatalog {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            titles: iter.into_iter().collect(),
        }
    }
}
