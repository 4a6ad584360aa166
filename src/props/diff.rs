//! Prop diff - minimal update payload between two committed prop sets.
//!
//! # Rules
//!
//! - Same `Rc` on both sides: empty payload.
//! - No previous set (first commit): the whole next set.
//! - Otherwise a key is included when its value changed. Primitives compare
//!   by value; plain mappings and lists compare entry by entry, one level
//!   deep, so a render pass that rebuilds an equivalent `style` object does
//!   not trigger an update.
//! - Keys that disappeared are included as [`PropValue::Null`] (explicit
//!   unset). A key absent from the payload always means "unchanged".

use super::value::{PropMap, PropValue, Props};

/// Payload handed to `commit_update`.
pub type UpdatePayload = PropMap;

/// Compute the update payload for `next` given the previously committed set.
pub fn prepare_update(prev: Option<&Props>, next: &Props) -> UpdatePayload {
    let Some(prev) = prev else {
        return next.as_ref().clone();
    };

    if std::rc::Rc::ptr_eq(prev, next) {
        return UpdatePayload::new();
    }

    let mut payload = UpdatePayload::new();

    for (key, value) in next.iter() {
        match prev.get(key) {
            Some(old) if old.same(value) => continue,
            Some(old) if value.is_structured() && old.shallow_eq(value) => continue,
            _ => {}
        }
        payload.insert(key.clone(), value.clone());
    }

    for key in prev.keys() {
        if !next.contains_key(key) {
            payload.insert(key.clone(), PropValue::Null);
        }
    }

    payload
}

/// Fold a payload into a committed prop set, dropping explicit unsets.
pub fn apply_payload(prev: &PropMap, payload: &UpdatePayload) -> PropMap {
    let mut merged = prev.clone();
    for (key, value) in payload {
        if value.is_null() {
            merged.shift_remove(key);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::Callback;
    use crate::{prop_map, props};
    use proptest::prelude::*;
    use std::rc::Rc;

    #[test]
    fn test_same_reference_is_empty() {
        let p = props! { "class" => "p-4", "visible" => true };
        assert!(prepare_update(Some(&p), &p).is_empty());
    }

    #[test]
    fn test_first_commit_is_whole_set() {
        let p = props! { "class" => "p-4", "visible" => true };
        let payload = prepare_update(None, &p);
        assert_eq!(payload.len(), 2);
        assert!(payload["class"].same(&PropValue::from("p-4")));
    }

    #[test]
    fn test_only_changed_keys() {
        let a = props! { "class" => "p-4", "text" => "hi", "value" => 1 };
        let b = props! { "class" => "p-4", "text" => "bye", "value" => 1 };
        let payload = prepare_update(Some(&a), &b);
        assert_eq!(payload.keys().collect::<Vec<_>>(), vec!["text"]);
    }

    #[test]
    fn test_recreated_style_object_is_not_an_update() {
        let a = props! { "style" => prop_map! { "minWidth" => 16, "visible" => true } };
        let b = props! { "style" => prop_map! { "minWidth" => 16, "visible" => true } };
        assert!(prepare_update(Some(&a), &b).is_empty());

        let c = props! { "style" => prop_map! { "minWidth" => 20, "visible" => true } };
        assert_eq!(prepare_update(Some(&a), &c).len(), 1);
    }

    #[test]
    fn test_nested_beyond_one_level_compares_by_identity() {
        let a = props! { "style" => prop_map! { "inner" => prop_map! { "x" => 1 } } };
        let b = props! { "style" => prop_map! { "inner" => prop_map! { "x" => 1 } } };
        assert_eq!(prepare_update(Some(&a), &b).len(), 1);
    }

    #[test]
    fn test_nan_value_is_not_an_update() {
        let a = props! { "value" => f64::NAN, "style" => prop_map! { "minWidth" => f64::NAN } };
        let b = props! { "value" => f64::NAN, "style" => prop_map! { "minWidth" => f64::NAN } };
        assert!(prepare_update(Some(&a), &b).is_empty());
    }

    #[test]
    fn test_new_callback_instance_is_an_update() {
        let a = props! { "onClick" => Callback::new(|_| {}) };
        let b = props! { "onClick" => Callback::new(|_| {}) };
        assert_eq!(prepare_update(Some(&a), &b).len(), 1);

        let cb = Callback::new(|_| {});
        let c = props! { "onClick" => cb.clone() };
        let d = props! { "onClick" => cb };
        assert!(prepare_update(Some(&c), &d).is_empty());
    }

    #[test]
    fn test_removed_key_is_explicit_unset() {
        let a = props! { "tooltip" => "hello", "visible" => true };
        let b = props! { "visible" => true };
        let payload = prepare_update(Some(&a), &b);
        assert_eq!(payload.len(), 1);
        assert!(payload["tooltip"].is_null());

        let merged = apply_payload(&a, &payload);
        assert!(!merged.contains_key("tooltip"));
        assert_eq!(merged.len(), 1);
    }

    // =========================================================================
    // Property tests
    // =========================================================================

    fn arb_value() -> impl Strategy<Value = PropValue> {
        prop_oneof![
            any::<bool>().prop_map(PropValue::Bool),
            (0i32..4).prop_map(PropValue::from),
            "[a-c]{0,2}".prop_map(PropValue::from),
            prop::collection::vec(("[a-c]", 0i32..3), 0..3).prop_map(|entries| {
                let map: PropMap = entries
                    .into_iter()
                    .map(|(k, v)| (k, PropValue::from(v)))
                    .collect();
                PropValue::from(map)
            }),
        ]
    }

    fn arb_props() -> impl Strategy<Value = PropMap> {
        prop::collection::vec(("[a-e]", arb_value()), 0..6)
            .prop_map(|entries| entries.into_iter().collect())
    }

    proptest! {
        #[test]
        fn prop_diff_is_exact(a in arb_props(), b in arb_props()) {
            let a = Rc::new(a);
            let b = Rc::new(b);
            let payload = prepare_update(Some(&a), &b);

            for (key, value) in b.iter() {
                let unchanged = a.get(key).is_some_and(|old| old.shallow_eq(value));
                prop_assert_eq!(payload.contains_key(key), !unchanged);
            }
            for key in a.keys() {
                if !b.contains_key(key) {
                    prop_assert!(payload.get(key).is_some_and(PropValue::is_null));
                }
            }
            for key in payload.keys() {
                prop_assert!(a.contains_key(key) || b.contains_key(key));
            }

            // Folding the payload reproduces the next set.
            let merged = apply_payload(&a, &payload);
            prop_assert_eq!(merged.len(), b.len());
            for (key, value) in b.iter() {
                prop_assert!(merged.get(key).is_some_and(|m| m.shallow_eq(value)));
            }
        }

        #[test]
        fn prop_diff_of_self_is_empty(a in arb_props()) {
            let a = Rc::new(a);
            prop_assert!(prepare_update(Some(&a), &a).is_empty());
        }
    }
}
