// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capabilities a component needs from the node it is mounted on.
//!
//! A component never touches the document directly. Everything it does to the
//! tree goes through [`MountPoint`], which keeps the core independent of any
//! particular document implementation: [`web_sys::Element`] in the browser,
//! [`MockElement`](crate::mock::MockElement) in tests.

use std::fmt::Debug;

/// A node in a document tree that a component can render into and listen on.
///
/// Handles are cheap to clone and compare by node identity.
pub trait MountPoint: Clone + 'static {
    /// Descendant node handle returned by selector queries.
    type Node: Clone + PartialEq + 'static;

    /// Event delivered to listeners registered with [`listen`](MountPoint::listen).
    type Event: DelegatedEvent<Node = Self::Node> + 'static;

    /// Guard for a registered listener. Dropping it removes the listener.
    type Listener: 'static;

    /// Failure reported by the selector engine.
    type Error: Debug;

    /// Replace the entire content of this node with `markup`, destroying all
    /// of its current descendants.
    fn replace_content(&self, markup: &str);

    /// All descendants of this node matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Node>, Self::Error>;

    /// The closest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Result<Option<Self::Node>, Self::Error>;

    /// Register `handler` for every `event_type` event reaching this node,
    /// including events bubbling up from descendants.
    ///
    /// `handler` may be re-entered when it dispatches another event that
    /// reaches this node.
    fn listen<F>(&self, event_type: &str, handler: F) -> Self::Listener
    where
        F: Fn(&Self::Event) + 'static;
}

/// An event that can be routed by selector matching.
pub trait DelegatedEvent {
    type Node;

    /// The node the event was originally dispatched on.
    fn target_node(&self) -> Option<Self::Node>;
}
