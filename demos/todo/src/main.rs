use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;
use stencil::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlInputElement, KeyboardEvent};

mod filter;

use filter::Filter;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    description: String,
    completed: bool,
}

#[derive(Default)]
struct TodoApp;

impl Component<Element> for TodoApp {
    type Props = &'static str;

    fn setup(&mut self, _: &&'static str, state: &mut State) {
        state.insert("entries", json!([]));
        state.insert("filter", Filter::All.as_str());
    }

    fn template(&self, scope: &Scope<Self, Element>) -> String {
        let entries = entries(scope.state());
        let filter = Filter::from_state(scope.state());
        let active = entries.iter().filter(|entry| !entry.completed).count();

        let mut list = String::new();

        for (idx, entry) in entries.iter().enumerate().filter(|(_, entry)| filter.shows(entry.completed)) {
            let (class, checked) = if entry.completed {
                ("todo completed", " checked")
            } else {
                ("todo", "")
            };

            list.push_str(&format!(
                r#"<li class="{class}" data-idx="{idx}"><input class="toggle" type="checkbox"{checked}><label>{}</label><button class="destroy">x</button></li>"#,
                escape(&entry.description),
            ));
        }

        let mut filters = String::new();

        for option in Filter::ALL {
            let selected = if option == filter { " selected" } else { "" };

            filters.push_str(&format!(
                r##"<li><a class="filter{selected}" data-filter="{0}" href="#/{0}">{1}</a></li>"##,
                option.as_str(),
                option.label(),
            ));
        }

        format!(
            r#"<section class="todoapp">
<header class="header"><h1>{title}</h1><input class="new-todo" placeholder="What needs to be done?"></header>
<ul class="todo-list">{list}</ul>
<footer class="footer"><span class="todo-count"><strong>{active}</strong> {left}</span><ul class="filters">{filters}</ul><button class="clear-completed">Clear completed ({completed})</button></footer>
</section>"#,
            title = escape(scope.props()),
            left = if active == 1 { "item left" } else { "items left" },
            completed = entries.len() - active,
        )
    }

    fn mounted(&mut self, scope: &Scope<Self, Element>) {
        // Every render recreates the input, so focus has to be restored each time.
        if let Ok(Some(input)) = scope.target().query_selector(".new-todo") {
            if let Ok(input) = input.dyn_into::<HtmlInputElement>() {
                let _ = input.focus();
            }
        }
    }

    fn set_event(&self, events: &mut Events<Self, Element>) {
        events.add_event("keydown", ".new-todo", |link, event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if event.key() != "Enter" {
                return;
            }
            let Some(input) = event.target().and_then(|target| target.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };

            let description = input.value().trim().to_owned();

            if description.is_empty() {
                return;
            }
            debug!("adding entry {description:?}");

            update_entries(link, |entries| {
                entries.push(Entry {
                    description,
                    completed: false,
                })
            });
        });

        events.add_event("click", ".toggle", |link, event| {
            if let Some(idx) = index(event) {
                update_entries(link, |entries| {
                    if let Some(entry) = entries.get_mut(idx) {
                        entry.completed = !entry.completed;
                    }
                });
            }
        });

        events.add_event("click", ".destroy", |link, event| {
            if let Some(idx) = index(event) {
                update_entries(link, |entries| {
                    if idx < entries.len() {
                        entries.remove(idx);
                    }
                });
            }
        });

        events.add_event("click", ".clear-completed", |link, _| {
            update_entries(link, |entries| entries.retain(|entry| !entry.completed));
        });

        events.add_event("click", ".filters a", |link, event| {
            event.prevent_default();

            let filter = event
                .target_node()
                .and_then(|el| el.closest("[data-filter]").ok().flatten())
                .and_then(|el| el.get_attribute("data-filter"));

            if let Some(filter) = filter {
                link.set_state(json!({ "filter": filter }));
            }
        });
    }
}

fn entries(state: &State) -> Vec<Entry> {
    state.get("entries").unwrap_or_default()
}

fn update_entries<F>(link: &Link<TodoApp, Element>, mutator: F)
where
    F: FnOnce(&mut Vec<Entry>),
{
    let Some(mut list) = link.with_state(entries) else {
        return;
    };

    mutator(&mut list);
    link.set_state(json!({ "entries": list }));
}

/// Index of the entry the event happened in.
fn index(event: &Event) -> Option<usize> {
    event
        .target_node()?
        .closest("[data-idx]")
        .ok()??
        .get_attribute("data-idx")?
        .parse()
        .ok()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());

    stencil::web::start::<TodoApp>("app", "todos");
}
