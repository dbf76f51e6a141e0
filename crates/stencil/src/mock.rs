// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory document for testing components without a browser.
//!
//! [`MockElement`] implements [`MountPoint`] with the same observable behavior
//! the browser backend relies on: `replace_content` parses markup into fresh
//! nodes and detaches the old ones, selector queries run against the live
//! tree, and [`dispatch`](MockElement::dispatch) bubbles an event from its
//! target through every ancestor.
//!
//! ```
//! use stencil::mock::MockElement;
//!
//! let root = MockElement::new("div");
//!
//! root.replace_content(r#"<ul><li class="item"><b>one</b></li></ul>"#);
//!
//! let b = root.query_selector("li b").unwrap().unwrap();
//!
//! assert_eq!(b.text_content(), "one");
//! assert_eq!(b.closest(".item").unwrap().unwrap().tag(), "li");
//! ```
//!
//! Markup is parsed and selectors are matched by [`scraper`], so every
//! selector the browser accepts works here too.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::iter;
use std::rc::{Rc, Weak};

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};

use crate::{DelegatedEvent, MountPoint};

type Handler = Rc<dyn Fn(&MockEvent)>;

/// Malformed selector, reported the way a browser raises `SyntaxError`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{selector}` is not a valid selector: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

fn compile(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|err| SelectorError {
        selector: selector.to_owned(),
        reason: err.to_string(),
    })
}

struct Registered {
    key: u64,
    node: NodeId,
    event_type: String,
    handler: Handler,
}

struct Document {
    html: Html,
    listeners: Vec<Registered>,
    next_key: u64,
}

impl Document {
    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    fn element(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.node(id).and_then(ElementRef::wrap)
    }

    /// Inclusive ancestors of `id`, nearest first.
    fn path(&self, id: NodeId) -> Vec<NodeId> {
        iter::successors(self.node(id), |node| node.parent())
            .map(|node| node.id())
            .collect()
    }
}

/// Append deep copies of the children of `source` under `parent`.
fn append_children(tree: &mut Tree<Node>, parent: NodeId, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let Some(mut node) = tree.get_mut(parent) else {
            return;
        };
        let id = node.append(child.value().clone()).id();

        append_children(tree, id, child);
    }
}

/// Handle to an element of an in-memory document.
///
/// Clones refer to the same element; equality is node identity.
#[derive(Clone)]
pub struct MockElement {
    doc: Rc<RefCell<Document>>,
    id: NodeId,
}

impl MockElement {
    /// Create a detached element in a new, empty document.
    ///
    /// Tags the HTML parser only accepts in a particular context, like
    /// table parts, produce an `html` element instead.
    pub fn new(tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        let mut html = Html::parse_document(&format!("<{tag}></{tag}>"));

        let id = html
            .tree
            .nodes()
            .find(|node| node.value().as_element().map_or(false, |el| el.name() == tag))
            .map_or_else(|| html.root_element().id(), |node| node.id());

        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }

        let doc = Document {
            html,
            listeners: Vec::new(),
            next_key: 0,
        };

        MockElement {
            doc: Rc::new(RefCell::new(doc)),
            id,
        }
    }

    fn at(&self, id: NodeId) -> Self {
        MockElement {
            doc: self.doc.clone(),
            id,
        }
    }

    pub fn tag(&self) -> String {
        let doc = self.doc.borrow();

        doc.element(self.id).map(|el| el.value().name().to_owned()).unwrap_or_default()
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        let doc = self.doc.borrow();

        doc.element(self.id)?.value().attr(name).map(str::to_owned)
    }

    /// The parent element, `None` for roots and for detached nodes.
    pub fn parent(&self) -> Option<MockElement> {
        let doc = self.doc.borrow();
        let parent = ElementRef::wrap(doc.node(self.id)?.parent()?)?;

        Some(self.at(parent.id()))
    }

    /// Child elements, skipping text.
    pub fn children(&self) -> Vec<MockElement> {
        let doc = self.doc.borrow();
        let Some(node) = doc.node(self.id) else {
            return Vec::new();
        };

        node.children()
            .filter_map(ElementRef::wrap)
            .map(|child| self.at(child.id()))
            .collect()
    }

    /// Serialized content of this element.
    pub fn inner_html(&self) -> String {
        let doc = self.doc.borrow();

        doc.element(self.id).map(|el| el.inner_html()).unwrap_or_default()
    }

    pub fn outer_html(&self) -> String {
        let doc = self.doc.borrow();

        doc.element(self.id).map(|el| el.html()).unwrap_or_default()
    }

    pub fn text_content(&self) -> String {
        let doc = self.doc.borrow();

        doc.element(self.id).map(|el| el.text().collect()).unwrap_or_default()
    }

    /// Detach all current children and parse `markup` in their place.
    ///
    /// Listeners registered on the detached nodes are unregistered, as the
    /// nodes can no longer be reached from the document.
    pub fn replace_content(&self, markup: &str) {
        let fragment = Html::parse_fragment(markup);
        let mut doc = self.doc.borrow_mut();

        let Some(node) = doc.node(self.id) else {
            return;
        };
        let old: Vec<NodeId> = node.children().map(|child| child.id()).collect();
        let detached: Vec<NodeId> = node
            .children()
            .flat_map(|child| child.descendants())
            .map(|node| node.id())
            .collect();

        for child in old {
            if let Some(mut child) = doc.html.tree.get_mut(child) {
                child.detach();
            }
        }
        doc.listeners.retain(|listener| !detached.contains(&listener.node));

        // Fragments are parsed into a synthetic `<html>` root.
        append_children(&mut doc.html.tree, self.id, *fragment.root_element());
    }

    pub fn matches(&self, selector: &str) -> Result<bool, SelectorError> {
        let selector = compile(selector)?;
        let doc = self.doc.borrow();

        Ok(doc.element(self.id).map_or(false, |el| selector.matches(&el)))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<MockElement>, SelectorError> {
        let selector = compile(selector)?;
        let doc = self.doc.borrow();
        let Some(node) = doc.node(self.id) else {
            return Ok(Vec::new());
        };

        Ok(node
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| selector.matches(el))
            .map(|el| self.at(el.id()))
            .collect())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<MockElement>, SelectorError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// This element or its closest ancestor matching `selector`.
    pub fn closest(&self, selector: &str) -> Result<Option<MockElement>, SelectorError> {
        let selector = compile(selector)?;
        let doc = self.doc.borrow();

        Ok(iter::successors(doc.node(self.id), |node| node.parent())
            .filter_map(ElementRef::wrap)
            .find(|el| selector.matches(el))
            .map(|el| self.at(el.id())))
    }

    /// Register `handler` for `event_type` events reaching this element.
    /// The listener is removed when the returned guard is dropped.
    pub fn listen<F>(&self, event_type: &str, handler: F) -> MockListener
    where
        F: Fn(&MockEvent) + 'static,
    {
        let mut doc = self.doc.borrow_mut();
        let key = doc.next_key;

        doc.next_key += 1;
        doc.listeners.push(Registered {
            key,
            node: self.id,
            event_type: event_type.to_owned(),
            handler: Rc::new(handler),
        });

        MockListener {
            doc: Rc::downgrade(&self.doc),
            key,
        }
    }

    /// Number of listeners currently registered on this element.
    pub fn listener_count(&self) -> usize {
        self.doc
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.node == self.id)
            .count()
    }

    /// Fire an `event_type` event at this element. It bubbles through every
    /// ancestor present at the time of dispatch, running listeners in
    /// registration order, until one of them stops propagation.
    ///
    /// Listeners may dispatch further events, including to themselves.
    pub fn dispatch(&self, event_type: &str) -> MockEvent {
        let path = self.doc.borrow().path(self.id);

        let event = MockEvent {
            event_type: event_type.to_owned(),
            target: self.clone(),
            current: Cell::new(self.id),
            stopped: Cell::new(false),
        };

        for node in path {
            let handlers: Vec<Handler> = self
                .doc
                .borrow()
                .listeners
                .iter()
                .filter(|listener| listener.node == node && listener.event_type == event_type)
                .map(|listener| listener.handler.clone())
                .collect();

            event.current.set(node);

            for handler in handlers {
                handler(&event);
            }

            if event.stopped.get() {
                break;
            }
        }

        event
    }
}

impl PartialEq for MockElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.doc, &other.doc) && self.id == other.id
    }
}

impl Eq for MockElement {}

impl fmt::Debug for MockElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockElement({:?} <{}>)", self.id, self.tag())
    }
}

/// Guard returned by [`MockElement::listen`].
pub struct MockListener {
    doc: Weak<RefCell<Document>>,
    key: u64,
}

impl Drop for MockListener {
    fn drop(&mut self) {
        if let Some(doc) = self.doc.upgrade() {
            doc.borrow_mut().listeners.retain(|listener| listener.key != self.key);
        }
    }
}

/// Event fired by [`MockElement::dispatch`].
pub struct MockEvent {
    event_type: String,
    target: MockElement,
    current: Cell<NodeId>,
    stopped: Cell<bool>,
}

impl MockEvent {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The element the event was dispatched on.
    pub fn target(&self) -> MockElement {
        self.target.clone()
    }

    /// The element whose listeners are currently running.
    pub fn current_target(&self) -> MockElement {
        self.target.at(self.current.get())
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl DelegatedEvent for MockEvent {
    type Node = MockElement;

    fn target_node(&self) -> Option<MockElement> {
        Some(self.target())
    }
}

impl MountPoint for MockElement {
    type Node = MockElement;
    type Event = MockEvent;
    type Listener = MockListener;
    type Error = SelectorError;

    fn replace_content(&self, markup: &str) {
        MockElement::replace_content(self, markup)
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<MockElement>, SelectorError> {
        MockElement::query_selector_all(self, selector)
    }

    fn closest(&self, node: &MockElement, selector: &str) -> Result<Option<MockElement>, SelectorError> {
        node.closest(selector)
    }

    fn listen<F>(&self, event_type: &str, handler: F) -> MockListener
    where
        F: Fn(&MockEvent) + 'static,
    {
        MockElement::listen(self, event_type, handler)
    }
}
