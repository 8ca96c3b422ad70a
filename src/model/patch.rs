//! Sparse update values.

use serde::{Deserialize, Deserializer};

/// A field of a merge update: either left alone or overwritten.
///
/// Absent JSON keys deserialize to `Unset` (with `#[serde(default)]` on the
/// field); present keys, including `null` for nullable fields, to `Set`.
/// `Patch<Option<T>>` therefore tells "keep" (`Unset`) apart from "clear"
/// (`Set(None)`).
#[derive(Clone, Debug, PartialEq)]
pub enum Patch<T> {
    Unset,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    /// Overwrite `slot` when set.
    pub fn apply_to(self, slot: &mut T) {
        if let Patch::Set(v) = self {
            *slot = v;
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Changes {
        #[serde(default)]
        title: Patch<String>,
        #[serde(default)]
        description: Patch<Option<String>>,
    }

    #[test]
    fn missing_null_and_value_are_distinct() {
        let c: Changes = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(c.title, Patch::Unset);
        assert_eq!(c.description, Patch::Set(None));

        let c: Changes = serde_json::from_str(r#"{"title": "x", "description": "y"}"#).unwrap();
        assert_eq!(c.title, Patch::Set("x".to_string()));
        assert_eq!(c.description, Patch::Set(Some("y".to_string())));

        let c: Changes = serde_json::from_str("{}").unwrap();
        assert_eq!(c.title, Patch::Unset);
        assert_eq!(c.description, Patch::Unset);
    }

    #[test]
    fn null_for_required_field_is_rejected() {
        assert!(serde_json::from_str::<Changes>(r#"{"title": null}"#).is_err());
    }

    #[test]
    fn apply_to_only_writes_when_set() {
        let mut slot = 1;
        Patch::Unset.apply_to(&mut slot);
        assert_eq!(slot, 1);
        Patch::from(7).apply_to(&mut slot);
        assert_eq!(slot, 7);
    }
}
