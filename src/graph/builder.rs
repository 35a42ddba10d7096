use crate::{Graph, InjectResult, Object, Source};

/// Collects objects and datasources so they can be wired together in a
/// single connection pass.
///
/// ```
/// use graph_injector::{constant, shared, structure, Graph, LockExt, MemorySource};
///
/// structure! {
///     pub struct Job {
///         #[inject("job.name")]
///         pub name: String,
///         #[inject]
///         pub retries: u8,
///     }
/// }
///
/// let source = MemorySource::new();
/// source.insert("job.name", "nightly");
///
/// let job = shared(Job { name: String::new(), retries: 0 });
/// let mut builder = Graph::builder();
/// builder.provide(job.clone());
/// builder.provide(constant(3_u8));
/// builder.add_datasource(source);
///
/// let graph = builder.build().unwrap();
/// assert_eq!(0, graph.unmet_dependencies());
/// assert_eq!("nightly", job.with_inner(|job| job.name.clone()));
/// ```
#[derive(Debug, Default)]
pub struct GraphBuilder {
    objects: Vec<Object>,
    sources: Vec<Source>,
}

impl GraphBuilder {
    pub fn provide(&mut self, object: impl Into<Object>) -> &mut Self {
        self.objects.push(object.into());
        self
    }

    pub fn add_datasource(&mut self, source: impl Into<Source>) -> &mut Self {
        self.sources.push(source.into());
        self
    }

    /// Builds the graph. Fails if any of the datasources is neither a reader
    /// nor a writer.
    pub fn build(self) -> InjectResult<Graph> {
        let mut graph = Graph::new();
        graph.register_datasources(self.sources)?;
        for object in self.objects {
            graph.insert(object);
        }

        graph.connect();
        graph.rebuild_indexes();
        Ok(graph)
    }
}
