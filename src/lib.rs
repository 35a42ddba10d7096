//! Runtime dependency resolution.
//!
//! A [`Graph`] holds an open set of objects keyed by their concrete type.
//! Whenever objects are registered, the graph looks through every registered
//! structure for fields that request a value, and fills each unset one with
//! the first compatible value it can find. Objects never need to be wired
//! together by hand, and they can be registered in any order.
//!
//! By default, objects held by the graph are not thread-safe. This is
//! because `Rc<RefCell<T>>` is used to hold shared objects, which is not a
//! thread-safe pointer type. This can be changed by disabling default
//! features and enabling the "arc" feature, which uses `Arc<Mutex<T>>`
//! instead:
//!
//! ```text
//! graph_injector = {
//!     version = "*",
//!     default_features = false,
//!     features = ["arc"]
//! }
//! ```
//!
//! # Requesting values
//!
//! Structures describe which of their fields should be filled in using the
//! [`structure!`] macro. Only `pub` fields are ever filled in, and a field is
//! only filled in while it is unset (`None`, zero, or empty). Fields that are
//! already set are left alone, so registering objects again never overwrites
//! anything.
//!
//! A request can list datasource keys. Those keys are looked up in the
//! graph's datasources before any registered object is considered, and
//! whatever value ends up assigned to a keyed field is written back to every
//! datasource writer.
//!
//! # Interfaces
//!
//! A field of type `Shared<dyn Trait>` can be filled by any registered shared
//! object whose type is listed as an implementation of that trait with the
//! [`interface!`] macro. A structure is never used to fill its own fields,
//! so two objects that each implement the interface the other requests are
//! wired to each other.
//!
//! # Example
//!
//! ```
//! use graph_injector::{
//!     interface, shared, structure, Graph, LockExt, MemorySource, Object,
//!     Shared,
//! };
//! use std::error::Error;
//!
//! // This is our interface. The `Send` and `Sync` supertrait requirements
//! // are only necessary when compiling with the "arc" feature.
//! trait Greeter: Send + Sync {
//!     fn greet(&self, visitor: &str) -> String;
//! }
//!
//! struct Polite;
//! impl Greeter for Polite {
//!     fn greet(&self, visitor: &str) -> String {
//!         format!("Good morning, {}.", visitor)
//!     }
//! }
//!
//! // Specify which types implement the Greeter interface. This only
//! // registers the types as possible implementations; which one is used
//! // depends on what gets registered with the graph.
//! interface!(Greeter = [Polite]);
//!
//! structure! {
//!     pub struct Reception {
//!         #[inject]
//!         pub greeter: Option<Shared<dyn Greeter>>,
//!         #[inject("reception.visitor")]
//!         pub visitor: String,
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn Error>> {
//!     let settings = MemorySource::new();
//!     settings.insert("reception.visitor", String::from("Ada"));
//!
//!     let reception = shared(Reception {
//!         greeter: None,
//!         visitor: String::new(),
//!     });
//!
//!     let mut graph = Graph::new();
//!     graph.add_datasource(settings)?;
//!     graph.provide(reception.clone());
//!     graph.provide(Object::handle(shared(Polite)));
//!     graph.assert()?;
//!
//!     let greeting = reception.with_inner(|reception| {
//!         reception.greeter.as_ref().map(|greeter| {
//!             greeter.with_inner(|greeter| greeter.greet(&reception.visitor))
//!         })
//!     });
//!     assert_eq!(Some(String::from("Good morning, Ada.")), greeting);
//!
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::needless_pass_by_value
)]

#[cfg(not(any(feature = "arc", feature = "rc")))]
compile_error!(
    "Either the 'arc' or 'rc' feature must be enabled (but not both)."
);

#[cfg(all(feature = "arc", feature = "rc"))]
compile_error!(
    "The 'arc' and 'rc' features are mutually exclusive and cannot be enabled together."
);

mod datasource;
mod graph;
mod reflect;
mod services;

pub use datasource::*;
pub use graph::*;
pub use reflect::*;
pub use services::*;

#[cfg(test)]
mod tests;
