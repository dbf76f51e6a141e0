// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use stencil::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

#[derive(Default)]
struct Counter {
    mounted: usize,
}

impl<M: MountPoint> Component<M> for Counter {
    type Props = ();

    fn setup(&mut self, _: &(), state: &mut State) {
        state.insert("count", 0);
    }

    fn template(&self, scope: &Scope<Self, M>) -> String {
        let count: i64 = scope.state().get("count").unwrap_or(0);

        format!(r#"<span class="count">{count}</span><button class="inc"><b>+</b></button>"#)
    }

    fn mounted(&mut self, _: &Scope<Self, M>) {
        self.mounted += 1;
    }

    fn set_event(&self, events: &mut Events<Self, M>) {
        events.add_event("click", ".inc", |link, _| {
            let count: i64 = link.with_state(|state| state.get("count")).flatten().unwrap_or(0);

            link.set_state(json!({ "count": count + 1 }));
        });
    }
}

fn root() -> Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let root = document.create_element("div").unwrap();

    stencil::web::body().unwrap().append_child(&root).unwrap();
    root
}

fn click(root: &Element, selector: &str) {
    root.query_selector(selector)
        .unwrap()
        .unwrap()
        .unchecked_into::<HtmlElement>()
        .click();
}

#[wasm_bindgen_test]
fn renders_initial_state() {
    let root = root();
    let base = ComponentBase::<Counter, _>::new(root.clone(), ());

    assert_eq!(root.query_selector(".count").unwrap().unwrap().text_content().unwrap(), "0");
    assert_eq!(base.component().mounted, 1);
}

#[wasm_bindgen_test]
fn delegated_click_survives_rerender() {
    let root = root();
    let base = ComponentBase::<Counter, _>::new(root.clone(), ());

    click(&root, ".inc b");
    click(&root, ".inc");
    click(&root, ".count");

    assert_eq!(base.state().get::<i64>("count"), Some(2));
    assert_eq!(root.query_selector(".count").unwrap().unwrap().inner_html(), "2");
    assert_eq!(base.component().mounted, 3);
}

#[wasm_bindgen_test]
fn stacked_bindings_fire_independently() {
    let root = root();
    let base = ComponentBase::<Counter, _>::new(root.clone(), ());
    let hits = Rc::new(Cell::new(0));

    for _ in 0..2 {
        let hits = hits.clone();

        base.add_event("click", ".count", move |_, _| hits.set(hits.get() + 1));
    }

    click(&root, ".count");

    assert_eq!(hits.get(), 2);
}

#[wasm_bindgen_test]
fn dropping_component_removes_listeners() {
    let root = root();
    let base = ComponentBase::<Counter, _>::new(root.clone(), ());
    let link = base.link();

    drop(base);
    click(&root, ".inc");

    assert!(!link.is_mounted());
    assert_eq!(root.query_selector(".count").unwrap().unwrap().inner_html(), "0");
}
