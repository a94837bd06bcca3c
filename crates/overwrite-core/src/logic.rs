//! Normalized AND/OR requirement trees and their merge rules.
//!
//! The requirement list `[[1, 2], [3, 4], [5, 6], 7]` reads as
//! `(1 OR 2) AND (3 OR 4) AND (5 OR 6) AND 7`. Scalars collect into the
//! mandatory `and` set and every nested list becomes one OR-group in
//! `deep_and`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::requirement::RequirementItem;

/// A requirement tree in normal form.
///
/// Satisfied iff every element of `and` is present and every group in
/// `deep_and` has at least one element present. An absent field is no
/// constraint. Group order is insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedLogic<T: Ord> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and: Option<BTreeSet<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_and: Option<Vec<BTreeSet<T>>>,
}

impl<T: Ord> Default for NormalizedLogic<T> {
    fn default() -> Self {
        Self {
            and: None,
            deep_and: None,
        }
    }
}

impl<T: Ord + Clone> NormalizedLogic<T> {
    /// Build a tree from a requirement list.
    ///
    /// An empty list yields a tree with both fields absent.
    pub fn build(items: impl IntoIterator<Item = RequirementItem<T>>) -> Self {
        let mut and = BTreeSet::new();
        let mut deep_and = Vec::new();

        for item in items {
            match item {
                RequirementItem::Single(value) => {
                    and.insert(value);
                }
                RequirementItem::AnyOf(group) => {
                    deep_and.push(group.into_iter().collect::<BTreeSet<T>>());
                }
            }
        }

        Self::from_parts(and, deep_and)
    }

    /// Combine two trees as "this AND that".
    ///
    /// `None` is the identity on either side, and an empty tree behaves as
    /// `None`: a result with no constraint is returned as `None`. Mandatory
    /// sets are unioned; groups are concatenated (`a` first) and never
    /// deduplicated against each other.
    pub fn merge(a: Option<Self>, b: Option<Self>) -> Option<Self> {
        let merged = match (a, b) {
            (None, None) => return None,
            (Some(x), None) | (None, Some(x)) => x,
            (Some(a), Some(b)) => {
                let mut and = a.and.unwrap_or_default();
                and.extend(b.and.unwrap_or_default());

                let mut deep_and = a.deep_and.unwrap_or_default();
                deep_and.extend(b.deep_and.unwrap_or_default());

                Self::from_parts(and, deep_and)
            }
        };

        (!merged.is_empty()).then_some(merged)
    }

    fn from_parts(and: BTreeSet<T>, deep_and: Vec<BTreeSet<T>>) -> Self {
        Self {
            and: if and.is_empty() { None } else { Some(and) },
            deep_and: if deep_and.is_empty() {
                None
            } else {
                Some(deep_and)
            },
        }
    }
}

impl<T: Ord> NormalizedLogic<T> {
    /// True when the tree places no constraint at all.
    pub fn is_empty(&self) -> bool {
        self.and.as_ref().map_or(true, BTreeSet::is_empty)
            && self.deep_and.as_ref().map_or(true, Vec::is_empty)
    }

    /// Number of OR-groups.
    pub fn group_count(&self) -> usize {
        self.deep_and.as_ref().map_or(0, Vec::len)
    }
}

/// Ordered concatenation of two flat lists, duplicates kept.
///
/// `None` is the identity on either side.
pub fn concat_list<T>(a: Option<Vec<T>>, b: Option<Vec<T>>) -> Option<Vec<T>> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(mut a), Some(b)) => {
            a.extend(b);
            Some(a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set<const N: usize>(items: [i64; N]) -> BTreeSet<i64> {
        items.into_iter().collect()
    }

    #[test]
    fn test_build_splits_scalars_and_groups() {
        let logic = NormalizedLogic::build(vec![
            RequirementItem::Single(1),
            RequirementItem::AnyOf(vec![2, 3]),
            RequirementItem::Single(4),
        ]);

        assert_eq!(logic.and, Some(set([1, 4])));
        assert_eq!(logic.deep_and, Some(vec![set([2, 3])]));
    }

    #[test]
    fn test_build_empty_has_no_fields() {
        let logic = NormalizedLogic::<i64>::build(Vec::new());
        assert_eq!(logic, NormalizedLogic::default());
        assert!(logic.is_empty());
    }

    #[test]
    fn test_build_dedupes_within_and_and_groups() {
        let logic = NormalizedLogic::build(vec![
            RequirementItem::Single(7),
            RequirementItem::Single(7),
            RequirementItem::AnyOf(vec![1, 1, 2]),
        ]);
        assert_eq!(logic.and, Some(set([7])));
        assert_eq!(logic.deep_and, Some(vec![set([1, 2])]));
    }

    #[test]
    fn test_build_keeps_group_order() {
        let logic = NormalizedLogic::build(vec![
            RequirementItem::AnyOf(vec![9, 8]),
            RequirementItem::AnyOf(vec![1]),
            RequirementItem::AnyOf(vec![5, 4]),
        ]);
        assert_eq!(
            logic.deep_and,
            Some(vec![set([8, 9]), set([1]), set([4, 5])])
        );
    }

    #[test]
    fn test_merge_identity() {
        let x = NormalizedLogic::build(vec![RequirementItem::Single(1)]);
        assert_eq!(NormalizedLogic::merge(Some(x.clone()), None), Some(x.clone()));
        assert_eq!(NormalizedLogic::merge(None, Some(x.clone())), Some(x));
        assert_eq!(NormalizedLogic::<i64>::merge(None, None), None);
    }

    #[test]
    fn test_merge_with_empty_tree_is_identity() {
        let x = NormalizedLogic::build(vec![
            RequirementItem::Single(1),
            RequirementItem::AnyOf(vec![2, 3]),
        ]);
        let empty = NormalizedLogic::build(Vec::new());

        assert_eq!(
            NormalizedLogic::merge(Some(empty.clone()), Some(x.clone())),
            Some(x.clone())
        );
        assert_eq!(NormalizedLogic::merge(Some(x.clone()), Some(empty)), Some(x));
    }

    #[test]
    fn test_empty_tree_merges_like_none() {
        let empty = NormalizedLogic::<i64>::build(Vec::new());

        assert_eq!(NormalizedLogic::merge(Some(empty.clone()), None), None);
        assert_eq!(NormalizedLogic::merge(None, Some(empty.clone())), None);
        assert_eq!(
            NormalizedLogic::merge(Some(empty.clone()), Some(empty)),
            None
        );
    }

    #[test]
    fn test_merge_unions_and_concatenates_groups() {
        let a = NormalizedLogic::build(vec![
            RequirementItem::Single(1),
            RequirementItem::AnyOf(vec![10, 11]),
        ]);
        let b = NormalizedLogic::build(vec![
            RequirementItem::Single(1),
            RequirementItem::Single(2),
            RequirementItem::AnyOf(vec![11, 10]),
        ]);

        let merged = NormalizedLogic::merge(Some(a), Some(b)).unwrap();
        assert_eq!(merged.and, Some(set([1, 2])));
        // Identical groups from both sides are both kept.
        assert_eq!(merged.deep_and, Some(vec![set([10, 11]), set([10, 11])]));
        assert_eq!(merged.group_count(), 2);
    }

    #[test]
    fn test_merge_group_order_follows_arguments() {
        let a = NormalizedLogic::build(vec![RequirementItem::AnyOf(vec![1])]);
        let b = NormalizedLogic::build(vec![RequirementItem::AnyOf(vec![2])]);

        let ab = NormalizedLogic::merge(Some(a.clone()), Some(b.clone())).unwrap();
        let ba = NormalizedLogic::merge(Some(b), Some(a)).unwrap();
        assert_eq!(ab.deep_and, Some(vec![set([1]), set([2])]));
        assert_eq!(ba.deep_and, Some(vec![set([2]), set([1])]));
    }

    #[test]
    fn test_concat_list_keeps_duplicates_and_order() {
        assert_eq!(
            concat_list(Some(vec![1, 2]), Some(vec![2, 3])),
            Some(vec![1, 2, 2, 3])
        );
        assert_eq!(concat_list(Some(vec![1]), None), Some(vec![1]));
        assert_eq!(concat_list(None, Some(vec![1])), Some(vec![1]));
        assert_eq!(concat_list::<i64>(None, None), None);
    }

    #[test]
    fn test_serializes_camel_case_and_skips_absent() {
        let logic = NormalizedLogic::build(vec![
            RequirementItem::Single("a".to_string()),
            RequirementItem::AnyOf(vec!["b".to_string(), "c".to_string()]),
        ]);
        let json = serde_json::to_value(&logic).unwrap();
        assert_eq!(json, serde_json::json!({"and": ["a"], "deepAnd": [["b", "c"]]}));

        let empty = serde_json::to_value(NormalizedLogic::<String>::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));
    }
}
