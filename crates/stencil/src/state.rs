// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The state bag owned by every component.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A mapping from string keys to arbitrary JSON values.
///
/// Components never mutate their state in place once mounted: every
/// [`set_state`](crate::ComponentBase::set_state) builds a new `State` with
/// [`merge`](State::merge) and replaces the old one.
///
/// ```
/// use stencil::State;
/// use serde_json::json;
///
/// let state: State = [("count", json!(0)), ("label", json!("clicks"))].into_iter().collect();
///
/// let next = state.merge(json!({ "count": 5 }).into());
///
/// assert_eq!(next.get::<u32>("count"), Some(5));
/// assert_eq!(next.get::<String>("label").as_deref(), Some("clicks"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Map<String, Value>);

impl State {
    pub fn new() -> Self {
        State(Map::new())
    }

    /// Shallow merge: every key of `partial` overwrites the same key of
    /// `self`, all other keys of `self` are kept.
    pub fn merge(&self, partial: State) -> State {
        let mut merged = self.0.clone();

        for (key, value) in partial.0 {
            merged.insert(key, value);
        }

        State(merged)
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Deserialize the value under `key`. Returns `None` if the key is absent
    /// or holds a value of a different shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        T::deserialize(self.0.get(key)?).ok()
    }

    /// Set a single key. Meant for `setup`, before the first render.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for State {
    fn from(map: Map<String, Value>) -> Self {
        State(map)
    }
}

/// Objects contribute their keys. Any other value contributes nothing, the
/// shape of a partial update is not validated.
impl From<Value> for State {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => State(map),
            _ => State::new(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for State
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        State(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_and_keeps() {
        let base: State = json!({ "a": 1, "b": 2 }).into();
        let merged = base.merge(json!({ "b": 3, "c": 4 }).into());

        assert_eq!(merged, State::from(json!({ "a": 1, "b": 3, "c": 4 })));
        assert_eq!(base, State::from(json!({ "a": 1, "b": 2 })));
    }

    #[test]
    fn merge_is_shallow() {
        let base: State = json!({ "user": { "name": "Ann", "age": 30 } }).into();
        let merged = base.merge(json!({ "user": { "name": "Bob" } }).into());

        assert_eq!(merged.get_value("user"), Some(&json!({ "name": "Bob" })));
    }

    #[test]
    fn non_object_partial_is_empty() {
        let base: State = json!({ "a": 1 }).into();

        assert_eq!(base.merge(json!(5).into()), base);
        assert_eq!(base.merge(Value::Null.into()), base);
    }

    #[test]
    fn typed_get() {
        let state: State = [("count", json!(7)), ("name", json!("seven"))].into_iter().collect();

        assert_eq!(state.get::<i64>("count"), Some(7));
        assert_eq!(state.get::<String>("count"), None);
        assert_eq!(state.get::<i64>("missing"), None);
        assert_eq!(state.get::<String>("name").as_deref(), Some("seven"));
    }

    fn partial() -> impl Strategy<Value = Vec<(String, i64)>> {
        prop::collection::vec(("[a-e]", any::<i64>()), 0..6)
    }

    proptest! {
        #[test]
        fn merge_is_left_fold_last_write_wins(
            initial in partial(),
            updates in prop::collection::vec(partial(), 0..8),
        ) {
            let mut state: State = initial.iter().cloned().collect();
            let mut expected: std::collections::BTreeMap<String, i64> = initial.into_iter().collect();

            for update in updates {
                state = state.merge(update.iter().cloned().collect());
                expected.extend(update);
            }

            prop_assert_eq!(state.len(), expected.len());

            for (key, value) in expected {
                prop_assert_eq!(state.get::<i64>(&key), Some(value));
            }
        }
    }
}
