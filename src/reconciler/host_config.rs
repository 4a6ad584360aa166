//! The mutation contract a declarative rendering engine drives.

use crate::props::{Props, UpdatePayload};

/// Host side of reconciliation.
///
/// Operations are applied in the order they are issued and are never
/// merged; the native tree has no transactions, so issue order is the
/// whole correctness contract. No operation fails: unknown kinds, missing
/// siblings and freed instances all fall back to the nearest safe action.
pub trait HostConfig {
    /// Handle to one live element. Text instances use the same type.
    type Instance: Clone;

    fn create_instance(&self, kind: &str, props: &Props) -> Self::Instance;

    fn create_text_instance(&self, text: &str) -> Self::Instance;

    /// True when `kind` renders its all-text children itself, so no child
    /// instances are created for them.
    fn should_set_text_content(&self, kind: &str, props: &Props) -> bool;

    /// Attach a child while building a detached subtree.
    fn append_initial_child(&self, parent: &Self::Instance, child: &Self::Instance) {
        self.append_child(parent, child);
    }

    fn append_child(&self, parent: &Self::Instance, child: &Self::Instance);

    fn append_child_to_container(&self, child: &Self::Instance);

    fn insert_before(&self, parent: &Self::Instance, child: &Self::Instance, before: &Self::Instance);

    fn insert_in_container_before(&self, child: &Self::Instance, before: &Self::Instance);

    /// Detach and permanently free `child`.
    fn remove_child(&self, parent: &Self::Instance, child: &Self::Instance);

    fn remove_child_from_container(&self, child: &Self::Instance);

    fn clear_container(&self);

    fn prepare_update(&self, instance: &Self::Instance, old: Option<&Props>, new: &Props) -> UpdatePayload;

    fn commit_update(&self, instance: &Self::Instance, payload: &UpdatePayload);

    fn commit_text_update(&self, instance: &Self::Instance, text: &str);
}
