//! View store: pluggable view kinds and the live instances shown inside
//! tile leaves.
//!
//! A kind is registered once with a factory; instances are spawned from it
//! and addressed by [`ViewId`] from tile tabs. The store does not decide
//! when instances die — the application removes an instance when it acts on
//! a tab-close signal.

use std::collections::HashMap;

use tracing::warn;

use crate::tile::ViewId;
use crate::ui::{BoxIdx, Ui};

/// A view hosted in a tile leaf.
pub trait View {
    /// Title shown in the leaf's tab pill.
    fn title(&self) -> String;

    /// Declares the view's boxes. The caller has already reopened the
    /// leaf's content box, so declarations land inside it.
    fn build(&mut self, ui: &mut Ui, content: BoxIdx);
}

type ViewFactory = Box<dyn Fn() -> Box<dyn View>>;

/// A live view instance.
pub struct ViewInstance {
    pub id: ViewId,
    /// The kind name this instance was spawned from.
    pub kind: String,
    pub view: Box<dyn View>,
}

/// Registry of view kinds and instances.
#[derive(Default)]
pub struct ViewStore {
    kinds: HashMap<String, ViewFactory>,
    instances: HashMap<ViewId, ViewInstance>,
    next_id: ViewId,
}

impl ViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view kind. Re-registering a name replaces the factory
    /// (and is worth a log line, since it usually means a wiring mistake).
    pub fn register(&mut self, kind: &str, factory: impl Fn() -> Box<dyn View> + 'static) {
        if self.kinds.insert(kind.to_string(), Box::new(factory)).is_some() {
            warn!(kind, "view kind registered twice; factory replaced");
        }
    }

    /// Spawns an instance of a registered kind. Returns `None` for unknown
    /// kinds.
    pub fn spawn(&mut self, kind: &str) -> Option<ViewId> {
        let factory = self.kinds.get(kind)?;
        self.next_id += 1;
        let id = self.next_id;
        self.instances.insert(
            id,
            ViewInstance {
                id,
                kind: kind.to_string(),
                view: factory(),
            },
        );
        Some(id)
    }

    pub fn get(&self, id: ViewId) -> Option<&ViewInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut ViewInstance> {
        self.instances.get_mut(&id)
    }

    /// Removes an instance; returns true if it existed.
    pub fn remove(&mut self, id: ViewId) -> bool {
        self.instances.remove(&id).is_some()
    }

    /// Tab title for an instance; unknown ids render as a placeholder
    /// rather than failing the frame.
    pub fn title(&self, id: ViewId) -> String {
        self.instances
            .get(&id)
            .map_or_else(|| "?".to_string(), |inst| inst.view.title())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        name: &'static str,
    }

    impl View for Dummy {
        fn title(&self) -> String {
            self.name.to_string()
        }

        fn build(&mut self, _ui: &mut Ui, _content: BoxIdx) {}
    }

    #[test]
    fn test_spawn_registered_kind() {
        let mut store = ViewStore::new();
        store.register("clock", || Box::new(Dummy { name: "Clock" }));

        let id = store.spawn("clock").unwrap();
        assert_eq!(store.title(id), "Clock");
        assert_eq!(store.get(id).unwrap().kind, "clock");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_spawn_unknown_kind() {
        let mut store = ViewStore::new();
        assert!(store.spawn("nope").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_instance() {
        let mut store = ViewStore::new();
        store.register("clock", || Box::new(Dummy { name: "Clock" }));
        let id = store.spawn("clock").unwrap();

        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut store = ViewStore::new();
        store.register("clock", || Box::new(Dummy { name: "Clock" }));
        let a = store.spawn("clock").unwrap();
        let b = store.spawn("clock").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_title_is_placeholder() {
        let store = ViewStore::new();
        assert_eq!(store.title(99), "?");
    }
}
