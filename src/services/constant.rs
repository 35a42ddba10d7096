use crate::{Object, Service};

/// Create an object from a constant value. Requested fields of type `T` (or
/// `Option<T>`) receive a clone of the value, so if it should be shared
/// between the objects that request it, register a [`Shared`](crate::Shared)
/// handle with [`Object::handle`] instead.
///
/// # Example
///
/// ```
/// use graph_injector::{constant, Graph};
///
/// let mut graph = Graph::new();
/// graph.provide(constant(8_i32));
///
/// let doubled = graph.invoke(|value: i32| value * 2, &[]).unwrap();
/// assert_eq!(16, doubled);
/// ```
///
/// # Shared state
///
/// To share state between everything that requests it, register a shared
/// handle instead. For instance, suppose you wanted to count how many times a
/// function was invoked through the graph:
///
/// ```
/// use graph_injector::{shared, Graph, LockExt, Object, Shared};
///
/// fn greet(calls: Shared<usize>) -> &'static str {
///     calls.with_inner_mut(|calls| *calls += 1);
///     "hello"
/// }
///
/// let calls = shared(0_usize);
/// let mut graph = Graph::new();
/// graph.provide(Object::handle(calls.clone()));
///
/// graph.invoke(greet, &[]).unwrap();
/// graph.invoke(greet, &[]).unwrap();
/// assert_eq!(2, calls.with_inner(|calls| *calls));
/// ```
#[must_use]
pub fn constant<T: Service>(value: T) -> Object {
    Object::value(value)
}
