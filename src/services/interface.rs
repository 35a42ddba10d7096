use crate::{downcast_shared, DynSvc, Service, Shared};

/// Indicates that registered objects can be viewed as shared handles of this
/// type. Every sized service type can view objects holding a
/// [`Shared`](crate::Shared) of exactly itself. Dynamic types (`dyn Trait`)
/// can't be checked at runtime without knowing their implementers, so any
/// interface using a trait must be declared explicitly with the
/// [`interface!`](crate::interface) macro.
pub trait Interface: Service {
    /// Attempts to view a type-erased object as a shared handle of this type.
    /// Returns `None` if the object isn't one of this interface's
    /// implementations.
    fn from_dyn(value: &DynSvc) -> Option<Shared<Self>>;
}

impl<T: Service> Interface for T {
    fn from_dyn(value: &DynSvc) -> Option<Shared<Self>> {
        downcast_shared::<T>(value)
    }
}

/// Marks a trait as being an interface for many other types. This means that
/// a field of type `Shared<dyn Trait>` can be filled with a registered
/// `Shared<T>` of any of the types listed in this macro invocation.
///
/// # Example
/// ```
/// use graph_injector::interface;
///
/// struct Bar;
/// #[cfg(test)]
/// struct MockBar;
///
/// trait Foo: Send + Sync {}
/// impl Foo for Bar {}
/// #[cfg(test)]
/// impl Foo for MockBar {}
///
/// // Fields of `Shared<dyn Foo>` can be filled by a shared `Bar` or, in a
/// // test run, a shared `MockBar`. Note that attributes are allowed on each of
/// // the listed types.
/// interface!(
///     Foo = [
///         Bar,
///         #[cfg(test)]
///         MockBar,
///     ]
/// );
/// ```
#[macro_export]
macro_rules! interface {
    ($trait:tt = [$($(#[$attr:meta])* $impl:ty),* $(,)?]) => {
        impl $crate::Interface for dyn $trait {
            fn from_dyn(
                value: &$crate::DynSvc,
            ) -> Option<$crate::Shared<Self>> {
                $(
                    $(#[$attr])*
                    let value = match <$impl as $crate::Interface>::from_dyn(value) {
                        Some(shared) => {
                            let shared: $crate::Shared<Self> = shared;
                            return Some(shared);
                        }
                        None => value,
                    };
                )*

                let _ = value;
                None
            }
        }
    };
}
