use crate::{DatasourceError, DynSvc, Service, Svc, TypeInfo};
use std::fmt::{Debug, Formatter};

/// Provides values for requested fields by key. Keys are the strings listed
/// in a field's `#[inject(...)]` marker.
pub trait DatasourceReader {
    /// Reads the value stored under `key`.
    fn read(&self, key: &str) -> Result<DynSvc, DatasourceError>;
}

/// Receives the values the graph assigns to keyed fields.
pub trait DatasourceWriter {
    /// Stores `value` under `key`. Failures are logged but don't affect
    /// resolution.
    fn write(&self, key: &str, value: DynSvc) -> Result<(), DatasourceError>;
}

/// Something that can be added to a graph as a datasource. Implementors
/// expose whichever of the reader and writer capabilities they support.
/// Types that support neither are rejected when added.
pub trait Datasource: Service {
    fn as_reader(&self) -> Option<&dyn DatasourceReader> {
        None
    }

    fn as_writer(&self) -> Option<&dyn DatasourceWriter> {
        None
    }
}

impl<D: Datasource> Datasource for Svc<D> {
    fn as_reader(&self) -> Option<&dyn DatasourceReader> {
        D::as_reader(self)
    }

    fn as_writer(&self) -> Option<&dyn DatasourceWriter> {
        D::as_writer(self)
    }
}

/// Adapts a [`DatasourceReader`] into a read-only [`Datasource`].
///
/// ```
/// use graph_injector::{
///     structure, shared, DatasourceError, DatasourceReader, DynSvc, Graph,
///     LockExt, Reader, Svc,
/// };
///
/// struct Env;
///
/// impl DatasourceReader for Env {
///     fn read(&self, key: &str) -> Result<DynSvc, DatasourceError> {
///         match key {
///             "app.port" => Ok(Svc::new(8080_u16)),
///             _ => Err(DatasourceError::missing(key)),
///         }
///     }
/// }
///
/// structure! {
///     pub struct App {
///         #[inject("app.port")]
///         pub port: u16,
///     }
/// }
///
/// let app = shared(App { port: 0 });
/// let mut graph = Graph::new();
/// graph.provide(app.clone());
/// graph.add_datasource(Reader(Env)).unwrap();
///
/// assert_eq!(8080, app.with_inner(|app| app.port));
/// ```
pub struct Reader<R>(pub R);

impl<R: DatasourceReader + Service> Datasource for Reader<R> {
    fn as_reader(&self) -> Option<&dyn DatasourceReader> {
        Some(&self.0)
    }
}

/// Adapts a [`DatasourceWriter`] into a write-only [`Datasource`].
pub struct Writer<W>(pub W);

impl<W: DatasourceWriter + Service> Datasource for Writer<W> {
    fn as_writer(&self) -> Option<&dyn DatasourceWriter> {
        Some(&self.0)
    }
}

/// A type-erased datasource, ready to be added to a graph.
#[derive(Clone)]
pub struct Source {
    type_info: TypeInfo,
    datasource: Svc<dyn Datasource>,
}

impl Source {
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[must_use]
    pub fn reader(&self) -> Option<&dyn DatasourceReader> {
        self.datasource.as_reader()
    }

    #[must_use]
    pub fn writer(&self) -> Option<&dyn DatasourceWriter> {
        self.datasource.as_writer()
    }
}

impl<D: Datasource> From<D> for Source {
    fn from(datasource: D) -> Self {
        Source {
            type_info: TypeInfo::of::<D>(),
            datasource: Svc::new(datasource),
        }
    }
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("type_info", &self.type_info)
            .field("reader", &self.reader().is_some())
            .field("writer", &self.writer().is_some())
            .finish()
    }
}
