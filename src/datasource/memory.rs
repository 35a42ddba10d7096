use crate::{
    lock, Datasource, DatasourceError, DatasourceReader, DatasourceWriter,
    DynSvc, Lock, LockExt, Service, Svc,
};
use std::{
    collections::HashMap,
    fmt::{Debug, Formatter},
};

/// An in-memory datasource that can be both read from and written to.
///
/// ```
/// use graph_injector::{structure, shared, Graph, LockExt, MemorySource, Svc};
///
/// structure! {
///     pub struct Limits {
///         #[inject("limits.max")]
///         pub max: i64,
///     }
/// }
///
/// let source = Svc::new(MemorySource::new());
/// source.insert("limits.max", 10_i32);
///
/// let limits = shared(Limits { max: 0 });
/// let mut graph = Graph::new();
/// graph.add_datasource(source.clone()).unwrap();
/// graph.provide(limits.clone());
///
/// assert_eq!(10, limits.with_inner(|limits| limits.max));
/// ```
pub struct MemorySource {
    entries: Lock<HashMap<String, DynSvc>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        MemorySource {
            entries: lock(HashMap::new()),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert<T: Service>(&self, key: impl Into<String>, value: T) {
        let value: DynSvc = Svc::new(value);
        self.entries
            .with_inner_mut(|entries| entries.insert(key.into(), value));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<DynSvc> {
        self.entries.with_inner(|entries| entries.get(key).cloned())
    }

    /// Gets a clone of the value stored under `key`, if it has type `T`.
    #[must_use]
    pub fn get_as<T: Service + Clone>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.with_inner(|entries| entries.contains_key(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.with_inner(HashMap::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        MemorySource::new()
    }
}

impl DatasourceReader for MemorySource {
    fn read(&self, key: &str) -> Result<DynSvc, DatasourceError> {
        self.get(key).ok_or_else(|| DatasourceError::missing(key))
    }
}

impl DatasourceWriter for MemorySource {
    fn write(&self, key: &str, value: DynSvc) -> Result<(), DatasourceError> {
        self.entries
            .with_inner_mut(|entries| entries.insert(key.to_owned(), value));
        Ok(())
    }
}

impl Datasource for MemorySource {
    fn as_reader(&self) -> Option<&dyn DatasourceReader> {
        Some(self)
    }

    fn as_writer(&self) -> Option<&dyn DatasourceWriter> {
        Some(self)
    }
}

impl Debug for MemorySource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut keys = self
            .entries
            .with_inner(|entries| entries.keys().cloned().collect::<Vec<_>>());
        keys.sort();
        f.debug_struct("MemorySource").field("keys", &keys).finish()
    }
}
