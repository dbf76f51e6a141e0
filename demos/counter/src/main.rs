use log::debug;
use serde_json::json;
use stencil::prelude::*;

/// Counts clicks, stepping by the amount given in props.
#[derive(Default)]
struct Counter {
    renders: u32,
}

impl<M: MountPoint> Component<M> for Counter {
    type Props = i64;

    fn setup(&mut self, _: &i64, state: &mut State) {
        state.insert("count", 0);
    }

    fn template(&self, scope: &Scope<Self, M>) -> String {
        let count: i64 = scope.state().get("count").unwrap_or(0);
        let step = scope.props();

        let times = match count {
            0 => "zero times.".to_owned(),
            1 => "once.".to_owned(),
            n => format!("{n} times."),
        };

        format!(
            r#"<h3>You've clicked the button {times}</h3>
<button class="inc">+{step}</button>
<button class="dec">-{step}</button>
<button class="reset">Reset</button>"#
        )
    }

    fn mounted(&mut self, _: &Scope<Self, M>) {
        self.renders += 1;
        debug!("counter rendered {} time(s)", self.renders);
    }

    fn set_event(&self, events: &mut Events<Self, M>) {
        events.add_event("click", ".inc", |link, _| step(link, 1));
        events.add_event("click", ".dec", |link, _| step(link, -1));
        events.add_event("click", ".reset", |link, _| link.set_state(json!({ "count": 0 })));
    }
}

fn step<M: MountPoint>(link: &Link<Counter, M>, sign: i64) {
    let Some(count) = link.with_state(|state| state.get::<i64>("count").unwrap_or(0)) else {
        return;
    };
    let Some(delta) = link.props(|step| *step * sign) else {
        return;
    };

    link.set_state(json!({ "count": count + delta }));
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());

    stencil::web::start::<Counter>("app", 1);
}
