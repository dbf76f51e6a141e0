// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Browser backend: any [`Element`] can be a mount point.

use log::error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt};
use web_sys::{Element, Event, EventTarget, Node};

use crate::{Component, ComponentBase, DelegatedEvent, MountPoint};

impl MountPoint for Element {
    type Node = Element;
    type Event = Event;
    type Listener = WebListener;
    type Error = JsValue;

    fn replace_content(&self, markup: &str) {
        self.set_inner_html(markup);
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, JsValue> {
        let list = Element::query_selector_all(self, selector)?;

        Ok((0..list.length())
            .filter_map(|idx| list.get(idx))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn closest(&self, node: &Element, selector: &str) -> Result<Option<Element>, JsValue> {
        Element::closest(node, selector)
    }

    fn listen<F>(&self, event_type: &str, handler: F) -> WebListener
    where
        F: Fn(&Event) + 'static,
    {
        let closure = Closure::<dyn Fn(Event)>::new(move |event: Event| handler(&event));

        if let Err(err) = self.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref()) {
            error!("failed to listen for `{event_type}`: {err:?}");
        }

        WebListener {
            target: self.clone().into(),
            event_type: event_type.to_owned(),
            closure,
        }
    }
}

/// Registered DOM listener. Dropping it removes the listener.
///
/// The callback may be re-entered by events it dispatches itself.
pub struct WebListener {
    target: EventTarget,
    event_type: String,
    closure: Closure<dyn Fn(Event)>,
}

impl Drop for WebListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(&self.event_type, self.closure.as_ref().unchecked_ref());
    }
}

impl DelegatedEvent for Event {
    type Node = Element;

    /// The target element. Events targeting a text node resolve to the
    /// element containing it.
    fn target_node(&self) -> Option<Element> {
        match self.target()?.dyn_into::<Element>() {
            Ok(element) => Some(element),
            Err(target) => target.dyn_into::<Node>().ok()?.parent_element(),
        }
    }
}

pub fn element_by_id(id: &str) -> Option<Element> {
    web_sys::window()?.document()?.get_element_by_id(id)
}

pub fn body() -> Option<Element> {
    Some(web_sys::window()?.document()?.body()?.into())
}

/// Mount a default-constructed `C` on the element with the given `id` and
/// keep it alive for the lifetime of the page.
///
/// ```no_run
/// use stencil::prelude::*;
///
/// #[derive(Default)]
/// struct Hello;
///
/// impl<M: MountPoint> Component<M> for Hello {
///     type Props = &'static str;
///
///     fn template(&self, scope: &Scope<Self, M>) -> String {
///         format!("<h1>Hello {}!</h1>", scope.props())
///     }
/// }
///
/// fn main() {
///     stencil::web::start::<Hello>("app", "Stencil");
/// }
/// ```
pub fn start<C>(id: &str, props: C::Props)
where
    C: Component<Element> + Default,
{
    crate::init_panic_hook();

    let root = element_by_id(id).expect_throw("mount point not found");

    ComponentBase::<C, Element>::new(root, props).forget();
}
