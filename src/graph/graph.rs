use crate::{
    Assignable, GraphBuilder, InjectError, InjectFn, InjectResult, Node,
    Object, ResolveError, Source, TypeInfo,
};
use indexmap::IndexMap;
use std::fmt::{Debug, Formatter};
use tracing::debug;

/// A registry of objects keyed by their concrete type. Each time objects are
/// registered or datasources are added, the graph fills in every unset
/// requested field it can, first from the field's datasource keys and then
/// from the registered objects.
///
/// Objects are visited in the order they were registered. Registering a
/// second object of the same concrete type replaces the first and moves it to
/// the end of that order. Fields that were already filled in keep their
/// values.
///
/// ```
/// use graph_injector::{constant, interface, shared, structure, Graph, LockExt, Shared};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// structure! {
///     pub struct English {
///         #[inject]
///         pub name: String,
///     }
/// }
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         format!("Hello, {}!", self.name)
///     }
/// }
///
/// interface!(Greeter = [English]);
///
/// structure! {
///     pub struct Reception {
///         #[inject]
///         pub greeter: Option<Shared<dyn Greeter>>,
///     }
/// }
///
/// let reception = shared(Reception { greeter: None });
/// let mut graph = Graph::new();
/// graph.provide(reception.clone());
/// graph.provide(shared(English { name: String::new() }));
/// graph.provide(constant(String::from("world")));
/// graph.assert().unwrap();
///
/// let greeting = reception.with_inner(|reception| {
///     reception
///         .greeter
///         .as_ref()
///         .map(|greeter| greeter.with_inner(|greeter| greeter.greet()))
/// });
/// assert_eq!(Some(String::from("Hello, world!")), greeting);
/// ```
#[derive(Default)]
pub struct Graph {
    pub(crate) nodes: IndexMap<TypeInfo, Node>,
    pub(crate) unmet_dependencies: usize,
    pub(crate) errors: Vec<ResolveError>,
    pub(crate) datasource_readers: Vec<Source>,
    pub(crate) datasource_writers: Vec<Source>,
    pub(crate) indexes: Vec<TypeInfo>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Graph::default()
    }

    /// Creates a builder for a graph, which registers objects and datasources
    /// up front and wires them together in a single pass.
    #[must_use]
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// Registers an object, then fills in every requested field in the graph
    /// that can be filled.
    pub fn provide(&mut self, object: impl Into<Object>) {
        self.provide_all(std::iter::once(object.into()));
    }

    /// Registers several objects, then fills in every requested field in the
    /// graph that can be filled. If more than one object has the same
    /// concrete type, the last one wins.
    pub fn provide_all<I>(&mut self, objects: I)
    where
        I: IntoIterator<Item = Object>,
    {
        for object in objects {
            self.insert(object);
        }

        self.connect();
        self.rebuild_indexes();
    }

    pub(crate) fn insert(&mut self, object: Object) {
        let (registration_info, concrete_info) = object.classify();
        let node = Node::new(object);
        debug!(
            registration = registration_info.name(),
            concrete = concrete_info.name(),
            dependencies = node.dependencies().len(),
            "Registered object"
        );

        self.nodes.shift_remove(&concrete_info);
        self.nodes.insert(concrete_info, node);
    }

    pub(crate) fn rebuild_indexes(&mut self) {
        self.indexes = self.nodes.keys().copied().collect();
    }

    /// Adds a datasource. Its reader and writer capabilities are each
    /// registered if present, and a connection pass runs afterwards.
    ///
    /// Returns an error, without adding anything, if the datasource is
    /// neither a reader nor a writer.
    pub fn add_datasource(
        &mut self,
        source: impl Into<Source>,
    ) -> InjectResult<()> {
        self.add_datasources(std::iter::once(source.into()))
    }

    /// Adds several datasources at once. If any of them is neither a reader
    /// nor a writer, none of them are added.
    pub fn add_datasources<I>(&mut self, sources: I) -> InjectResult<()>
    where
        I: IntoIterator,
        I::Item: Into<Source>,
    {
        let sources: Vec<Source> = sources.into_iter().map(Into::into).collect();
        self.register_datasources(sources)?;
        self.connect();
        Ok(())
    }

    pub(crate) fn register_datasources(
        &mut self,
        sources: Vec<Source>,
    ) -> InjectResult<()> {
        if let Some(invalid) = sources
            .iter()
            .find(|source| source.reader().is_none() && source.writer().is_none())
        {
            return Err(InjectError::InvalidDatasource {
                type_info: invalid.type_info(),
            });
        }

        for source in sources {
            let reader = source.reader().is_some();
            let writer = source.writer().is_some();
            debug!(
                datasource = source.type_info().name(),
                reader,
                writer,
                "Added datasource"
            );

            if reader {
                self.datasource_readers.push(source.clone());
            }
            if writer {
                self.datasource_writers.push(source);
            }
        }

        Ok(())
    }

    /// Calls `function`, filling each argument from `extras` if one of them
    /// fits, or else from the registered objects.
    ///
    /// ```
    /// use graph_injector::{constant, Graph};
    ///
    /// let mut graph = Graph::new();
    /// graph.provide(constant(String::from("graph")));
    ///
    /// let length = graph.invoke(|text: String| text.len(), &[]).unwrap();
    /// assert_eq!(5, length);
    /// ```
    pub fn invoke<D, F: InjectFn<D>>(
        &self,
        function: F,
        extras: &[Object],
    ) -> InjectResult<F::Output> {
        function.invoke(self, extras)
    }

    pub(crate) fn resolve_argument<A: Assignable>(
        &self,
        index: usize,
        extras: &[Object],
    ) -> InjectResult<A> {
        let registered = self
            .indexes
            .iter()
            .filter_map(|type_info| self.nodes.get(type_info))
            .map(Node::object);

        extras
            .iter()
            .chain(registered)
            .find_map(|object| A::assign_from(object.as_dyn()))
            .ok_or(InjectError::MissingArgument {
                index,
                type_info: TypeInfo::of::<A>(),
            })
    }

    /// Checks that every requested field has been filled in.
    ///
    /// A graph is never finalised, so objects can still be registered after
    /// a failed check.
    pub fn assert(&self) -> InjectResult<()> {
        if self.unmet_dependencies > 0 || !self.errors.is_empty() {
            return Err(InjectError::Unresolved {
                unmet: self.unmet_dependencies,
                errors: self.errors.clone(),
            });
        }

        Ok(())
    }

    /// The number of requested fields the last connection pass couldn't
    /// fill.
    #[must_use]
    pub fn unmet_dependencies(&self) -> usize {
        self.unmet_dependencies
    }

    /// Every problem found during the last connection pass.
    #[must_use]
    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    /// The concrete types of the registered objects, in registration order.
    #[must_use]
    pub fn indexes(&self) -> &[TypeInfo] {
        &self.indexes
    }

    #[must_use]
    pub fn node(&self, type_info: TypeInfo) -> Option<&Node> {
        self.nodes.get(&type_info)
    }

    /// Mutable access to a node, for adding dependencies by hand. Call
    /// [`connect`](Self::connect) afterwards to fill them in.
    pub fn node_mut(&mut self, type_info: TypeInfo) -> Option<&mut Node> {
        self.nodes.get_mut(&type_info)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Debug for Graph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.values().collect::<Vec<_>>())
            .field("unmet_dependencies", &self.unmet_dependencies)
            .field("errors", &self.errors)
            .field("datasource_readers", &self.datasource_readers)
            .field("datasource_writers", &self.datasource_writers)
            .finish()
    }
}
