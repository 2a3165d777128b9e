// src/config/merge.rs

//! Functional merge over configuration fragments.
//!
//! `a.merge(&b)` never mutates either operand. Scalars are right-biased
//! (`b` wins when set), maps merge key by key (`b` wins on conflict) and
//! lists concatenate in fragment order.

use std::collections::BTreeMap;

/// Trait for merging configuration blocks.
pub trait Merge: Clone {
    /// Merge with another block, where `other` takes precedence for set fields.
    fn merge(&self, other: &Self) -> Self;
}

/// Merge two optional blocks.
///
/// - Both set: `base.merge(other)`
/// - Only one set: a copy of that one
/// - Neither set: `None`
pub fn merge_optional<T: Merge>(base: Option<&T>, other: Option<&T>) -> Option<T> {
    match (base, other) {
        (Some(b), Some(o)) => Some(b.merge(o)),
        (None, Some(o)) => Some(o.clone()),
        (Some(b), None) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Optional-block variant of [`merge_optional`] for `Option` fields.
pub fn merge_block<T: Merge>(base: &Option<T>, other: &Option<T>) -> Option<T> {
    merge_optional(base.as_ref(), other.as_ref())
}

/// Right-biased scalar override.
pub fn merge_scalar<T: Clone>(base: &Option<T>, other: &Option<T>) -> Option<T> {
    match other {
        Some(_) => other.clone(),
        None => base.clone(),
    }
}

/// Key-by-key map merge; `other` wins on conflicting keys.
pub fn merge_map<V: Clone>(base: &BTreeMap<String, V>, other: &BTreeMap<String, V>) -> BTreeMap<String, V> {
    let mut merged = base.clone();
    for (k, v) in other {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// `base ++ other`. Duplicates are preserved.
pub fn concat<T: Clone>(base: &[T], other: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(base.len() + other.len());
    merged.extend_from_slice(base);
    merged.extend_from_slice(other);
    merged
}

impl<T: Merge> Merge for Vec<T> {
    fn merge(&self, other: &Self) -> Self {
        concat(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Block {
        a: Option<String>,
        b: Option<u32>,
    }

    impl Merge for Block {
        fn merge(&self, other: &Self) -> Self {
            Block {
                a: merge_scalar(&self.a, &other.a),
                b: merge_scalar(&self.b, &other.b),
            }
        }
    }

    #[test]
    fn optional_merge_with_none_is_a_copy() {
        let x = Block {
            a: Some("x".into()),
            b: None,
        };
        assert_eq!(merge_optional(Some(&x), None), Some(x.clone()));
        assert_eq!(merge_optional(None, Some(&x)), Some(x.clone()));
        assert_eq!(merge_optional::<Block>(None, None), None);
    }

    #[test]
    fn scalar_override_keeps_explicit_empty() {
        let base = Block {
            a: Some("keep".into()),
            b: Some(1),
        };
        let other = Block {
            a: Some(String::new()),
            b: None,
        };
        let merged = base.merge(&other);
        assert_eq!(merged.a.as_deref(), Some(""));
        assert_eq!(merged.b, Some(1));
    }

    #[test]
    fn map_merge_is_keywise() {
        let base = BTreeMap::from([
            ("k1".to_string(), "a".to_string()),
            ("k2".to_string(), "b".to_string()),
        ]);
        let other = BTreeMap::from([
            ("k2".to_string(), "c".to_string()),
            ("k3".to_string(), "d".to_string()),
        ]);
        let merged = merge_map(&base, &other);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged["k1"], "a");
        assert_eq!(merged["k2"], "c");
        assert_eq!(merged["k3"], "d");
    }

    #[test]
    fn concat_preserves_duplicates_and_order() {
        let merged = concat(&["a", "b"], &["b", "c"]);
        assert_eq!(merged, vec!["a", "b", "b", "c"]);
    }
}
