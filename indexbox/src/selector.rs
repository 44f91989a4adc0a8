//! Splits predicates into direct id lookups and index set lookups.

use bytes::Bytes;
use indexbox_backend::Converter;
use indexbox_core::{EntityMetadata, MappingError, PathAndValue};
use tracing::trace;

/// Outcome of [`KeySelector::select`].
///
/// Every input predicate ends up on exactly one side: predicates on the
/// identifier property contribute their converted values to `keys`, all the
/// others are kept in `set_keys` and need an index set read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySelection {
    keys: Vec<Bytes>,
    set_keys: Vec<PathAndValue>,
}

impl KeySelection {
    /// Ids usable as-is, without touching any index set.
    #[inline]
    pub fn keys(&self) -> &[Bytes] {
        &self.keys
    }

    /// Predicates that must be resolved through index sets.
    #[inline]
    pub fn set_keys(&self) -> &[PathAndValue] {
        &self.set_keys
    }

    /// Splits the selection into its two parts.
    pub fn into_parts(self) -> (Vec<Bytes>, Vec<PathAndValue>) {
        (self.keys, self.set_keys)
    }
}

/// Partitions predicates by whether their path is the identifier property.
pub struct KeySelector;

impl KeySelector {
    /// Resolves every predicate path against `metadata` and partitions them.
    ///
    /// Fails on the first unknown path.
    pub fn select<'a, C, I>(
        converter: &C,
        predicates: I,
        metadata: &EntityMetadata,
    ) -> Result<KeySelection, MappingError>
    where
        C: Converter,
        I: IntoIterator<Item = &'a PathAndValue>,
    {
        let mut selection = KeySelection::default();
        for predicate in predicates {
            if metadata.resolve(predicate.path())?.is_id() {
                selection
                    .keys
                    .extend(predicate.values().iter().map(|value| converter.convert_id(value)));
            } else {
                selection.set_keys.push(predicate.clone());
            }
        }
        trace!(
            entity = metadata.name(),
            keys = selection.keys.len(),
            set_keys = selection.set_keys.len(),
            "Predicates selected"
        );
        Ok(selection)
    }
}
