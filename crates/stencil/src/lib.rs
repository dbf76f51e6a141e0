// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Stencil
//!
//! _Stateful components from string templates._
//!
//! **Stencil** is a minimal base for components that own a region of a document.
//! A component produces its markup as a plain `String`, keeps a single
//! [`State`] bag, and re-renders its whole region every time the state changes.
//! There is no virtual DOM and no diffing: the content of the mount point is
//! replaced wholesale, then the [`mounted`](Component::mounted) hook runs.
//!
//! Because every render destroys and recreates all descendant nodes, events
//! are never bound on the descendants themselves. Instead [`add_event`](Events::add_event)
//! attaches a single listener to the mount point and routes bubbling events to
//! whatever currently matches a selector, so bindings made once keep working
//! across any number of re-renders.
//!
//! ### Counter
//!
//! ```no_run
//! use serde_json::json;
//! use stencil::prelude::*;
//!
//! #[derive(Default)]
//! struct Counter;
//!
//! impl<M: MountPoint> Component<M> for Counter {
//!     type Props = ();
//!
//!     fn setup(&mut self, _: &(), state: &mut State) {
//!         state.insert("count", 0);
//!     }
//!
//!     fn template(&self, scope: &Scope<Self, M>) -> String {
//!         let count: i64 = scope.state().get("count").unwrap_or(0);
//!
//!         format!(r#"<p>{count}</p><button class="inc">+</button>"#)
//!     }
//!
//!     fn set_event(&self, events: &mut Events<Self, M>) {
//!         events.add_event("click", ".inc", |link, _| {
//!             let count: i64 = link.with_state(|state| state.get("count")).flatten().unwrap_or(0);
//!
//!             link.set_state(json!({ "count": count + 1 }));
//!         });
//!     }
//! }
//!
//! fn main() {
//!     if let Some(root) = stencil::web::element_by_id("app") {
//!         ComponentBase::<Counter, _>::new(root, ()).forget();
//!     }
//! }
//! ```
//!
//! ### Order of operations
//!
//! Constructing a [`ComponentBase`] always runs, in order:
//!
//! 1. [`Component::setup`], with no markup in the document yet,
//! 2. the initial render, followed by [`Component::mounted`],
//! 3. [`Component::set_event`], exactly once, against markup that already reflects
//!    the initial state.
//!
//! Every [`set_state`](ComponentBase::set_state) afterwards merges the partial
//! state, renders, and calls [`Component::mounted`] again. Updates are never
//! batched.

mod base;
mod event;
mod state;

pub mod mount;

#[cfg(feature = "web")]
pub mod web;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use base::{ComponentBase, Link, Scope};
pub use event::Events;
pub use mount::{DelegatedEvent, MountPoint};
pub use state::State;

/// The prelude module with most commonly used types.
pub mod prelude {
    pub use crate::{Component, ComponentBase, DelegatedEvent, Events, Link, MountPoint, Scope, State};
}

/// Re-exports for components implemented against a concrete backend
pub mod reexport {
    pub use serde_json;
    pub use wasm_bindgen;
    #[cfg(feature = "web")]
    pub use web_sys;
}

/// A component rendered into a mount point of type `M`.
///
/// Every hook has a default that does nothing, so a component only implements
/// the ones it needs. Components that only use the [`MountPoint`] capabilities
/// should be generic over `M`, components that need concrete DOM types can
/// implement this for [`web_sys::Element`] alone.
pub trait Component<M: MountPoint>: Sized + 'static {
    /// Input supplied by whoever creates the component. Stored as-is.
    type Props: 'static;

    /// Prepare initial state. Runs once, before any markup exists.
    fn setup(&mut self, _props: &Self::Props, _state: &mut State) {}

    /// Produce the markup for the current props and state.
    fn template(&self, _scope: &Scope<Self, M>) -> String {
        String::new()
    }

    /// Runs right after every render, once the new markup is in the document.
    fn mounted(&mut self, _scope: &Scope<Self, M>) {}

    /// Register delegated event bindings. Runs exactly once, after the first render.
    fn set_event(&self, _events: &mut Events<Self, M>) {}
}

/// Install a panic hook reporting panics to the browser console. Only does
/// anything in debug builds, and only the first time it is called.
pub fn init_panic_hook() {
    #[cfg(debug_assertions)]
    {
        use std::cell::Cell;

        thread_local! {
            static INIT: Cell<bool> = Cell::new(false);
        }
        if !INIT.with(|init| init.get()) {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));

            INIT.with(|init| init.set(true));
        }
    }
}
