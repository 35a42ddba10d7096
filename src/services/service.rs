#![allow(clippy::used_underscore_binding)]

use crate::StructPath;
use derive_more::{Display, Error};
use std::any::{Any, TypeId};

/// Scoped access to the value behind a [`Lock`].
pub trait LockExt<T: ?Sized> {
    /// Calls `f` with a shared reference to the locked value.
    fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R;

    /// Calls `f` with a mutable reference to the locked value.
    fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R;
}

#[cfg(feature = "arc")]
mod types {
    use super::LockExt;
    use crate::InjectError;
    use std::{
        any::Any,
        sync::{Arc, Mutex, PoisonError},
    };

    /// A reference-counted pointer holding a service. The pointer type is
    /// determined by the feature flags passed to this crate.
    pub type Svc<T> = Arc<T>;

    /// A reference-counted service pointer holding an instance of `dyn Any`.
    pub type DynSvc = Arc<dyn Any + Send + Sync>;

    /// The interior mutability wrapper used for shared objects.
    pub type Lock<T> = Mutex<T>;

    /// A result from attempting to resolve dependencies or invoke a function.
    pub type InjectResult<T> = Result<T, InjectError>;

    /// Implemented automatically on types that are capable of being a service.
    pub trait Service: Any + Send + Sync {}
    impl<T: ?Sized + Any + Send + Sync> Service for T {}

    impl<T: ?Sized> LockExt<T> for Mutex<T> {
        fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
            f(&*self.lock().unwrap_or_else(PoisonError::into_inner))
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            f(&mut *self.lock().unwrap_or_else(PoisonError::into_inner))
        }
    }

    pub(crate) fn lock<T>(value: T) -> Lock<T> {
        Mutex::new(value)
    }
}

#[cfg(feature = "rc")]
mod types {
    use super::LockExt;
    use crate::InjectError;
    use std::{any::Any, cell::RefCell, rc::Rc};

    /// A reference-counted pointer holding a service. The pointer type is
    /// determined by the feature flags passed to this crate.
    pub type Svc<T> = Rc<T>;

    /// A reference-counted service pointer holding an instance of `dyn Any`.
    pub type DynSvc = Rc<dyn Any>;

    /// The interior mutability wrapper used for shared objects.
    pub type Lock<T> = RefCell<T>;

    /// A result from attempting to resolve dependencies or invoke a function.
    pub type InjectResult<T> = Result<T, InjectError>;

    /// Implemented automatically on types that are capable of being a service.
    pub trait Service: Any {}
    impl<T: ?Sized + Any> Service for T {}

    impl<T: ?Sized> LockExt<T> for RefCell<T> {
        fn with_inner<R, F: FnOnce(&T) -> R>(&self, f: F) -> R {
            f(&*self.borrow())
        }

        fn with_inner_mut<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
            f(&mut *self.borrow_mut())
        }
    }

    pub(crate) fn lock<T>(value: T) -> Lock<T> {
        RefCell::new(value)
    }
}

pub use types::*;

/// A shared, mutable handle to an object. Objects registered through a
/// `Shared<T>` can have their fields filled in by the graph, and fields of
/// type `Shared<T>` (or `Shared<dyn Trait>`) receive the registered handle
/// itself rather than a copy.
pub type Shared<T> = Svc<Lock<T>>;

/// Wraps a value in a new [`Shared`] handle.
///
/// ```
/// use graph_injector::{shared, LockExt};
///
/// let counter = shared(1);
/// counter.with_inner_mut(|value| *value += 1);
/// assert_eq!(2, counter.with_inner(|value| *value));
/// ```
#[must_use]
pub fn shared<T>(value: T) -> Shared<T> {
    Svc::new(lock(value))
}

/// Attempts to recover a typed [`Shared`] handle from a type-erased value.
#[must_use]
pub fn downcast_shared<T: Service>(value: &DynSvc) -> Option<Shared<T>> {
    Svc::clone(value).downcast::<Lock<T>>().ok()
}

/// Identifies a type at runtime. Equality only considers the [`TypeId`]; the
/// name is kept for diagnostics.
#[derive(Clone, Copy, Debug, Display)]
#[display(fmt = "{}", name)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The module-qualified name of the type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl std::hash::Hash for TypeInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A problem found while filling in a single dependency. These are collected
/// during a connection pass rather than returned, so that one bad dependency
/// doesn't stop the rest of the graph from being wired.
#[derive(Clone, Debug, Display, Error)]
pub enum ResolveError {
    /// A segment of the dependency's path doesn't name a field.
    #[display(
        fmt = "can't find field {} in {}{}",
        "segment",
        "owner.name()",
        "path"
    )]
    FieldNotFound {
        owner: TypeInfo,
        path: StructPath,
        segment: String,
    },

    /// The path walks through something that isn't a structure.
    #[display(fmt = "{}{} is not a structure", "owner.name()", "path")]
    NotAStructure { owner: TypeInfo, path: StructPath },

    /// The target field is private, or is reached through a private field,
    /// or doesn't accept injected values.
    #[display(fmt = "{}{} can't be set", "owner.name()", "path")]
    NotWritable { owner: TypeInfo, path: StructPath },

    /// Neither the datasources nor the registered objects could provide a
    /// value for the field.
    #[display(
        fmt = "{}{}: couldn't find suitable dependency for {}",
        "owner.name()",
        "path",
        "dependency.name()"
    )]
    Unmet {
        owner: TypeInfo,
        path: StructPath,
        dependency: TypeInfo,
    },
}

impl ResolveError {
    /// Whether this error counts towards the graph's unmet dependencies.
    #[must_use]
    pub fn is_unmet(&self) -> bool {
        matches!(self, ResolveError::Unmet { .. })
    }
}

#[derive(Debug, Display, Error)]
#[display(fmt = "an error occurred during injection: {}")]
pub enum InjectError {
    /// The candidate implements neither reading nor writing.
    #[display(
        fmt = "{} is neither a datasource reader nor a datasource writer",
        "type_info.name()"
    )]
    InvalidDatasource { type_info: TypeInfo },

    /// No supplied or registered value could fill a function argument.
    #[display(
        fmt = "can't find value for argument {} [{}]",
        "index",
        "type_info.name()"
    )]
    MissingArgument { index: usize, type_info: TypeInfo },

    /// The graph still has dependencies it couldn't fill.
    #[display(
        fmt = "{} unmet dependencies [{}]",
        "unmet",
        "fmt_errors(errors)"
    )]
    Unresolved {
        unmet: usize,
        errors: Vec<ResolveError>,
    },
}

fn fmt_errors(errors: &[ResolveError]) -> String {
    let mut joined = String::new();
    for error in errors {
        if !joined.is_empty() {
            joined.push_str("; ");
        }
        joined.push_str(&error.to_string());
    }
    joined
}

/// An error reported by a datasource.
#[derive(Clone, Debug, Display, Error)]
pub enum DatasourceError {
    /// The datasource has no value for the key.
    #[display(fmt = "no value for key {}", "key")]
    Missing { key: String },

    /// The datasource failed while handling the key.
    #[display(fmt = "datasource failed for key {}: {}", "key", "message")]
    Failed { key: String, message: String },
}

impl DatasourceError {
    #[must_use]
    pub fn missing(key: &str) -> Self {
        DatasourceError::Missing {
            key: key.to_owned(),
        }
    }

    #[must_use]
    pub fn failed(key: &str, message: impl Into<String>) -> Self {
        DatasourceError::Failed {
            key: key.to_owned(),
            message: message.into(),
        }
    }
}
