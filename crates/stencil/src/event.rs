// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Delegated event bindings

use std::rc::Rc;

use log::{error, trace};

use crate::base::{Inner, Link};
use crate::{Component, DelegatedEvent, MountPoint};

/// Registrar handed to [`Component::set_event`].
pub struct Events<'a, C: Component<M>, M: MountPoint> {
    inner: &'a Rc<Inner<C, M>>,
}

impl<'a, C: Component<M>, M: MountPoint> Events<'a, C, M> {
    pub(crate) fn new(inner: &'a Rc<Inner<C, M>>) -> Self {
        Events { inner }
    }

    /// Attach one listener for `event_type` on the mount point. `callback`
    /// runs for every such event whose target matches `selector`, or sits
    /// inside an element that does.
    ///
    /// Matching is done against the content present when the event fires, so
    /// the binding keeps working after any number of re-renders.
    ///
    /// Calling this twice with the same arguments registers two listeners,
    /// and the callback will run twice per event.
    pub fn add_event<F>(&mut self, event_type: &str, selector: &str, callback: F)
    where
        F: Fn(&Link<C, M>, &M::Event) + 'static,
    {
        add_event(self.inner, event_type, selector, callback);
    }
}

pub(crate) fn add_event<C, M, F>(inner: &Rc<Inner<C, M>>, event_type: &str, selector: &str, callback: F)
where
    C: Component<M>,
    M: MountPoint,
    F: Fn(&Link<C, M>, &M::Event) + 'static,
{
    let link = Link {
        weak: Rc::downgrade(inner),
    };
    let selector = selector.to_owned();

    let listener = inner.target.listen(event_type, move |event| {
        let Some(target) = link.target() else {
            return;
        };
        let Some(node) = event.target_node() else {
            return;
        };

        match is_target(&target, &selector, &node) {
            Ok(true) => callback(&link, event),
            Ok(false) => trace!("event target does not match `{selector}`"),
            Err(err) => error!("delegated listener for `{selector}` failed: {err:?}"),
        }
    });

    inner.push_listener(listener);
}

/// Whether `node` is one of the descendants of `target` currently matching
/// `selector`, or has an inclusive ancestor that matches it.
pub(crate) fn is_target<M: MountPoint>(target: &M, selector: &str, node: &M::Node) -> Result<bool, M::Error> {
    let children = target.query_selector_all(selector)?;

    if children.contains(node) {
        return Ok(true);
    }

    Ok(target.closest(node, selector)?.is_some())
}
