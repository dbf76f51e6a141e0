// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cell::{Ref, RefCell};
use std::mem::ManuallyDrop;
use std::rc::{Rc, Weak};

use log::debug;

use crate::event::{self, Events};
use crate::{Component, MountPoint, State};

pub(crate) struct Inner<C: Component<M>, M: MountPoint> {
    pub(crate) target: M,
    props: C::Props,
    state: RefCell<State>,
    component: RefCell<C>,
    listeners: RefCell<Vec<M::Listener>>,
}

impl<C: Component<M>, M: MountPoint> Inner<C, M> {
    fn scope<'a>(&'a self, state: &'a State) -> Scope<'a, C, M> {
        Scope {
            target: &self.target,
            props: &self.props,
            state,
        }
    }

    pub(crate) fn render(&self) {
        let markup = {
            let state = self.state.borrow();

            self.component.borrow().template(&self.scope(&state))
        };

        self.target.replace_content(&markup);

        debug!("rendered {} bytes of markup", markup.len());

        let state = self.state.borrow();

        self.component.borrow_mut().mounted(&self.scope(&state));
    }

    pub(crate) fn set_state(&self, partial: State) {
        let next = self.state.borrow().merge(partial);

        *self.state.borrow_mut() = next;

        self.render();
    }

    pub(crate) fn push_listener(&self, listener: M::Listener) {
        self.listeners.borrow_mut().push(listener);
    }
}

/// Read-only view of a component's props and state, handed to
/// [`template`](Component::template) and [`mounted`](Component::mounted).
pub struct Scope<'a, C: Component<M>, M: MountPoint> {
    target: &'a M,
    props: &'a C::Props,
    state: &'a State,
}

impl<'a, C: Component<M>, M: MountPoint> Scope<'a, C, M> {
    pub fn props(&self) -> &'a C::Props {
        self.props
    }

    pub fn state(&self) -> &'a State {
        self.state
    }

    /// The mount point. In `mounted` its content is the markup that was just rendered.
    pub fn target(&self) -> &'a M {
        self.target
    }
}

/// A component instance bound to a mount point.
///
/// The instance owns its state and the listeners it registered on the mount
/// point. Dropping it releases both; use [`forget`](ComponentBase::forget)
/// to keep a top level component alive for the lifetime of the page.
pub struct ComponentBase<C: Component<M>, M: MountPoint> {
    inner: Rc<Inner<C, M>>,
}

impl<C: Component<M>, M: MountPoint> ComponentBase<C, M> {
    /// Mount a default-constructed `C` on `target`.
    pub fn new(target: M, props: C::Props) -> Self
    where
        C: Default,
    {
        Self::with(target, C::default(), props)
    }

    /// Mount `component` on `target`: runs `setup`, the initial render and
    /// `set_event`, in that order.
    pub fn with(target: M, mut component: C, props: C::Props) -> Self {
        let mut state = State::new();

        component.setup(&props, &mut state);

        let base = ComponentBase {
            inner: Rc::new(Inner {
                target,
                props,
                state: RefCell::new(state),
                component: RefCell::new(component),
                listeners: RefCell::new(Vec::new()),
            }),
        };

        base.inner.render();
        base.inner.component.borrow().set_event(&mut Events::new(&base.inner));

        debug!(
            "mounted component with {} delegated listener(s)",
            base.inner.listeners.borrow().len()
        );

        base
    }

    /// Replace the mount point content with a fresh `template` and run `mounted`.
    pub fn render(&self) {
        self.inner.render();
    }

    /// Shallow-merge `partial` into the current state and render.
    ///
    /// Renders unconditionally, even if nothing changed.
    ///
    /// # Panics
    ///
    /// Panics when called while this component is rendering, i.e. from
    /// inside its own `template` or `mounted`.
    pub fn set_state(&self, partial: impl Into<State>) {
        self.inner.set_state(partial.into());
    }

    /// Attach a delegated listener, see [`Events::add_event`].
    pub fn add_event<F>(&self, event_type: &str, selector: &str, callback: F)
    where
        F: Fn(&Link<C, M>, &M::Event) + 'static,
    {
        event::add_event(&self.inner, event_type, selector, callback);
    }

    pub fn target(&self) -> &M {
        &self.inner.target
    }

    pub fn props(&self) -> &C::Props {
        &self.inner.props
    }

    pub fn state(&self) -> Ref<'_, State> {
        self.inner.state.borrow()
    }

    pub fn component(&self) -> Ref<'_, C> {
        self.inner.component.borrow()
    }

    /// Weak handle to this component.
    pub fn link(&self) -> Link<C, M> {
        Link {
            weak: Rc::downgrade(&self.inner),
        }
    }

    /// Leak the component, keeping its listeners registered forever.
    pub fn forget(self) {
        let _leaked = ManuallyDrop::new(self);
    }
}

/// Weak handle to a mounted component, handed to delegated event callbacks.
///
/// All operations do nothing once the component has been dropped.
pub struct Link<C: Component<M>, M: MountPoint> {
    pub(crate) weak: Weak<Inner<C, M>>,
}

impl<C: Component<M>, M: MountPoint> Clone for Link<C, M> {
    fn clone(&self) -> Self {
        Link {
            weak: self.weak.clone(),
        }
    }
}

impl<C: Component<M>, M: MountPoint> Link<C, M> {
    /// Shallow-merge `partial` into the component state and render.
    pub fn set_state(&self, partial: impl Into<State>) {
        if let Some(inner) = self.weak.upgrade() {
            inner.set_state(partial.into());
        }
    }

    pub fn render(&self) {
        if let Some(inner) = self.weak.upgrade() {
            inner.render();
        }
    }

    /// Read the current state.
    pub fn with_state<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&State) -> R,
    {
        let inner = self.weak.upgrade()?;
        let state = inner.state.borrow();

        Some(f(&state))
    }

    pub fn props<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&C::Props) -> R,
    {
        self.weak.upgrade().map(|inner| f(&inner.props))
    }

    pub fn target(&self) -> Option<M> {
        self.weak.upgrade().map(|inner| inner.target.clone())
    }

    pub fn is_mounted(&self) -> bool {
        self.weak.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::mock::MockElement;

    type Calls = Rc<RefCell<Vec<&'static str>>>;

    struct Recorder {
        calls: Calls,
        mounted: usize,
    }

    impl Recorder {
        fn new(calls: &Calls) -> Self {
            Recorder {
                calls: calls.clone(),
                mounted: 0,
            }
        }
    }

    impl<M: MountPoint> Component<M> for Recorder {
        type Props = &'static str;

        fn setup(&mut self, _: &&'static str, state: &mut State) {
            self.calls.borrow_mut().push("setup");
            state.insert("count", 0);
        }

        fn template(&self, scope: &Scope<Self, M>) -> String {
            self.calls.borrow_mut().push("template");

            let count: i64 = scope.state().get("count").unwrap_or_default();

            format!("{}{count}", scope.props())
        }

        fn mounted(&mut self, _: &Scope<Self, M>) {
            self.calls.borrow_mut().push("mounted");
            self.mounted += 1;
        }

        fn set_event(&self, _: &mut Events<Self, M>) {
            self.calls.borrow_mut().push("set_event");
        }
    }

    #[test]
    fn construction_order() {
        let calls = Calls::default();
        let root = MockElement::new("div");

        let base = ComponentBase::with(root.clone(), Recorder::new(&calls), "");

        assert_eq!(&*calls.borrow(), &["setup", "template", "mounted", "set_event"]);
        assert_eq!(root.inner_html(), "0");
        assert_eq!(base.component().mounted, 1);
    }

    #[test]
    fn set_state_renders_once() {
        let calls = Calls::default();
        let root = MockElement::new("div");
        let base = ComponentBase::with(root.clone(), Recorder::new(&calls), "");

        calls.borrow_mut().clear();
        base.set_state(json!({ "count": 5 }));

        assert_eq!(root.inner_html(), "5");
        assert_eq!(&*calls.borrow(), &["template", "mounted"]);
        assert_eq!(base.component().mounted, 2);
    }

    #[test]
    fn unchanged_state_still_renders() {
        let calls = Calls::default();
        let root = MockElement::new("div");
        let base = ComponentBase::with(root.clone(), Recorder::new(&calls), "");

        base.set_state(json!({ "count": 0 }));
        base.set_state(json!({}));
        base.set_state(json!({ "count": 0 }));

        assert_eq!(base.component().mounted, 4);
        assert_eq!(root.inner_html(), "0");
    }

    #[test]
    fn updates_are_not_batched() {
        let calls = Calls::default();
        let root = MockElement::new("div");
        let base = ComponentBase::with(root.clone(), Recorder::new(&calls), "n=");

        base.set_state(json!({ "count": 1 }));
        assert_eq!(root.inner_html(), "n=1");

        base.set_state(json!({ "count": 2 }));
        assert_eq!(root.inner_html(), "n=2");

        assert_eq!(base.component().mounted, 3);
    }

    #[test]
    fn set_state_merges_shallow() {
        let calls = Calls::default();
        let base = ComponentBase::with(MockElement::new("div"), Recorder::new(&calls), "");

        base.set_state(json!({ "label": "a" }));
        base.set_state(json!({ "count": 3 }));

        assert_eq!(*base.state(), State::from(json!({ "count": 3, "label": "a" })));
    }

    #[test]
    fn props_stored_as_is() {
        let calls = Calls::default();
        let base = ComponentBase::with(MockElement::new("div"), Recorder::new(&calls), "props");

        base.set_state(json!({ "props": "changed" }));

        assert_eq!(*base.props(), "props");
        assert_eq!(base.target().inner_html(), "props0");
    }

    #[derive(Default)]
    struct Empty;

    impl<M: MountPoint> Component<M> for Empty {
        type Props = ();
    }

    #[test]
    fn default_hooks() {
        let root = MockElement::new("div");

        root.replace_content("<p>stale</p>");

        let base = ComponentBase::<Empty, _>::new(root.clone(), ());

        assert_eq!(root.inner_html(), "");
        assert!(base.state().is_empty());
    }

    #[test]
    fn link_outlives_component() {
        let calls = Calls::default();
        let root = MockElement::new("div");
        let base = ComponentBase::with(root.clone(), Recorder::new(&calls), "");
        let link = base.link();

        link.set_state(json!({ "count": 9 }));
        assert_eq!(root.inner_html(), "9");
        assert_eq!(link.with_state(|state| state.get::<i64>("count")), Some(Some(9)));

        drop(base);

        assert!(!link.is_mounted());
        link.set_state(json!({ "count": 10 }));
        assert_eq!(root.inner_html(), "9");
        assert_eq!(link.target(), None);
    }

    #[test]
    fn forget_keeps_listeners() {
        let root = MockElement::new("div");
        let base = ComponentBase::<Empty, _>::new(root.clone(), ());
        let link = base.link();
        let hits = Rc::new(RefCell::new(0));

        {
            let hits = hits.clone();

            base.add_event("click", "div", move |_, _| *hits.borrow_mut() += 1);
        }

        base.forget();

        root.dispatch("click");

        assert!(link.is_mounted());
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(root.listener_count(), 1);
    }
}
