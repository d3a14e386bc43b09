use std::collections::BTreeMap;

use thiserror::Error;

use super::HINTS_PER_TARGET;
use super::word::{HintImage, TargetWord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("target word must not be blank")]
    BlankTarget,

    #[error("target {target:?} has {count} hint images, expected 3")]
    HintCount { target: String, count: usize },

    #[error("hint catalog has no targets")]
    Empty,

    #[error("target {target:?} is not in the hint catalog")]
    UnknownTarget { target: String },
}

/// Read-only mapping from target word to its ordered hint images.
///
/// Every entry holds exactly `HINTS_PER_TARGET` images; the count is checked
/// on insert so the progression engine never has to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintCatalog {
    entries: BTreeMap<TargetWord, [HintImage; HINTS_PER_TARGET]>,
}

impl HintCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from `(word, images)` groups, as they come out of the dataset.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::BlankTarget` or `CatalogError::HintCount` for the
    /// first malformed group.
    pub fn from_groups<I, W, H>(groups: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (W, Vec<H>)>,
        W: Into<String>,
        H: Into<String>,
    {
        let mut catalog = Self::new();
        for (word, images) in groups {
            let target = TargetWord::new(word)?;
            catalog.insert(target, images.into_iter().map(HintImage::new).collect())?;
        }
        Ok(catalog)
    }

    /// Add or replace the hints for a target.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::HintCount` unless exactly `HINTS_PER_TARGET` images are given.
    pub fn insert(&mut self, target: TargetWord, hints: Vec<HintImage>) -> Result<(), CatalogError> {
        let hints: [HintImage; HINTS_PER_TARGET] =
            hints.try_into().map_err(|rejected: Vec<HintImage>| CatalogError::HintCount {
                target: target.as_str().to_owned(),
                count: rejected.len(),
            })?;
        self.entries.insert(target, hints);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Target words in a stable (sorted) order.
    pub fn targets(&self) -> impl Iterator<Item = &TargetWord> {
        self.entries.keys()
    }

    /// Iterate `(word, hints)` pairs in target order.
    pub fn iter(&self) -> impl Iterator<Item = (&TargetWord, &[HintImage; HINTS_PER_TARGET])> {
        self.entries.iter()
    }

    /// All hint images for a target.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTarget` if the word is not in the catalog.
    pub fn hints(&self, target: &TargetWord) -> Result<&[HintImage; HINTS_PER_TARGET], CatalogError> {
        self.entries
            .get(target)
            .ok_or_else(|| CatalogError::UnknownTarget {
                target: target.as_str().to_owned(),
            })
    }

    /// Hint images revealed so far, i.e. indices `0..=hint_index`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTarget` if the word is not in the catalog.
    pub fn revealed(&self, target: &TargetWord, hint_index: u32) -> Result<&[HintImage], CatalogError> {
        let hints = self.hints(target)?;
        let shown = usize::try_from(hint_index)
            .map_or(HINTS_PER_TARGET, |idx| idx.saturating_add(1).min(HINTS_PER_TARGET));
        Ok(&hints[..shown])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HintCatalog {
        HintCatalog::from_groups([
            ("banana", vec!["b0", "b1", "b2"]),
            ("apple", vec!["a0", "a1", "a2"]),
        ])
        .unwrap()
    }

    #[test]
    fn targets_are_sorted() {
        let catalog = sample();
        let words: Vec<&str> = catalog.targets().map(TargetWord::as_str).collect();
        assert_eq!(words, ["apple", "banana"]);
    }

    #[test]
    fn wrong_hint_count_is_rejected() {
        let err = HintCatalog::from_groups([("pear", vec!["p0", "p1"])]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::HintCount {
                target: "pear".into(),
                count: 2
            }
        );
    }

    #[test]
    fn revealed_grows_with_hint_index() {
        let catalog = sample();
        let apple = TargetWord::new("apple").unwrap();
        assert_eq!(catalog.revealed(&apple, 0).unwrap().len(), 1);
        assert_eq!(catalog.revealed(&apple, 2).unwrap().len(), 3);
        assert_eq!(catalog.revealed(&apple, 9).unwrap().len(), 3);
        assert_eq!(catalog.revealed(&apple, 1).unwrap()[1].as_str(), "a1");
    }

    #[test]
    fn unknown_target_lookup_fails() {
        let catalog = sample();
        let kiwi = TargetWord::new("kiwi").unwrap();
        assert!(matches!(
            catalog.hints(&kiwi),
            Err(CatalogError::UnknownTarget { .. })
        ));
    }
}
