use crate::{
    constant, interface, shared, structure, Datasource, DatasourceError,
    DatasourceReader, DatasourceWriter, Dependency, DynSvc, Field, FieldAccess,
    FieldMut, Graph, InjectError, Lock, LockExt, MemorySource, Object,
    ResolveError, Shared, Source, StructPath, Structure, Svc, TypeInfo,
    Writer,
};
use tracing_test::traced_test;

#[cfg(feature = "rc")]
trait Peer {
    fn id(&self) -> &'static str;
}

#[cfg(feature = "arc")]
trait Peer: Send + Sync {
    fn id(&self) -> &'static str;
}

#[cfg(feature = "rc")]
trait Speaker {
    fn speak(&self) -> String;
}

#[cfg(feature = "arc")]
trait Speaker: Send + Sync {
    fn speak(&self) -> String;
}

struct Database;

structure! {
    pub struct Repository {
        #[inject]
        pub database: Option<Shared<Database>>,
    }
}

structure! {
    pub struct Plain {
        pub f: String,
    }
}

structure! {
    pub struct Tagged {
        #[inject]
        pub f: String,
    }
}

structure! {
    pub struct Alpha {
        #[inject]
        pub peer: Option<Shared<dyn Peer>>,
    }
}

structure! {
    pub struct Beta {
        #[inject]
        pub peer: Option<Shared<dyn Peer>>,
    }
}

impl Peer for Alpha {
    fn id(&self) -> &'static str {
        "alpha"
    }
}

impl Peer for Beta {
    fn id(&self) -> &'static str {
        "beta"
    }
}

structure! {
    #[derive(Default)]
    pub struct Voice {
        #[inject]
        pub speaker: Option<Shared<dyn Speaker>>,
    }
}

structure! {
    pub struct Narrator {
        #[nested]
        pub voice: Voice,
    }
}

impl Speaker for Narrator {
    fn speak(&self) -> String {
        String::from("once upon a time")
    }
}

struct Parrot;
impl Speaker for Parrot {
    fn speak(&self) -> String {
        String::from("squawk")
    }
}

interface!(Peer = [Alpha, Beta]);
interface!(Speaker = [Narrator, Parrot]);

structure! {
    pub struct Limits {
        #[inject("a.b")]
        pub max: i64,
    }
}

structure! {
    pub struct Counter {
        #[inject("counter.start")]
        pub start: i32,
    }
}

structure! {
    #[derive(Default)]
    pub struct Inner {
        pub value: i32,
    }
}

structure! {
    pub struct Vault {
        #[inject]
        secret: i32,
        #[nested]
        inner: Inner,
        #[inject]
        pub count: i32,
    }
}

#[derive(Default)]
struct Recorder {
    writes: Lock<Vec<(String, DynSvc)>>,
}

impl Recorder {
    fn writes<T: Clone + 'static>(&self) -> Vec<(String, Option<T>)> {
        self.writes.with_inner(|writes| {
            writes
                .iter()
                .map(|(key, value)| {
                    (key.clone(), value.downcast_ref::<T>().cloned())
                })
                .collect()
        })
    }
}

impl DatasourceWriter for Recorder {
    fn write(&self, key: &str, value: DynSvc) -> Result<(), DatasourceError> {
        self.writes
            .with_inner_mut(|writes| writes.push((key.to_owned(), value)));
        Ok(())
    }
}

struct Broken;

impl DatasourceWriter for Broken {
    fn write(&self, key: &str, _value: DynSvc) -> Result<(), DatasourceError> {
        Err(DatasourceError::failed(key, "disk full"))
    }
}

struct Wrong;

impl DatasourceReader for Wrong {
    fn read(&self, _key: &str) -> Result<DynSvc, DatasourceError> {
        Ok(Svc::new(String::from("not a number")))
    }
}

impl Datasource for Wrong {
    fn as_reader(&self) -> Option<&dyn DatasourceReader> {
        Some(self)
    }
}

struct Inert;
impl Datasource for Inert {}

fn unmet_errors(graph: &Graph) -> usize {
    graph.errors().iter().filter(|error| error.is_unmet()).count()
}

#[test]
fn exact_type_fills_with_the_registered_value() {
    let database = shared(Database);
    let repository = shared(Repository { database: None });

    let mut graph = Graph::new();
    graph.provide(repository.clone());
    graph.provide(Object::handle(database.clone()));

    let filled = repository.with_inner(|repository| repository.database.clone());
    assert!(Svc::ptr_eq(&database, &filled.unwrap()));
    assert_eq!(0, graph.unmet_dependencies());
    assert!(graph.errors().is_empty());
}

#[test]
fn reconnecting_a_satisfied_graph_changes_nothing() {
    let database = shared(Database);
    let repository = shared(Repository { database: None });

    let mut graph = Graph::new();
    graph.provide_all(vec![
        Object::from(repository.clone()),
        Object::handle(database.clone()),
    ]);
    graph.assert().unwrap();

    graph.connect();
    graph.assert().unwrap();

    let filled = repository.with_inner(|repository| repository.database.clone());
    assert!(Svc::ptr_eq(&database, &filled.unwrap()));
}

#[test]
fn preset_fields_are_never_overwritten() {
    let original = shared(Database);
    let repository = shared(Repository {
        database: Some(original.clone()),
    });
    let counter = shared(Counter { start: 7 });

    let mut graph = Graph::new();
    graph.provide(repository.clone());
    graph.provide(counter.clone());
    graph.provide(Object::handle(shared(Database)));
    graph.provide(constant(3_i32));

    let kept = repository.with_inner(|repository| repository.database.clone());
    assert!(Svc::ptr_eq(&original, &kept.unwrap()));
    assert_eq!(7, counter.with_inner(|counter| counter.start));
}

#[test]
fn structures_never_satisfy_themselves() {
    let alpha = shared(Alpha { peer: None });

    let mut graph = Graph::new();
    graph.provide(alpha.clone());

    assert_eq!(1, graph.unmet_dependencies());
    assert_eq!(1, unmet_errors(&graph));
    assert!(alpha.with_inner(|alpha| alpha.peer.is_none()));
}

#[test]
fn structures_never_satisfy_their_nested_fields() {
    let narrator = shared(Narrator {
        voice: Voice::default(),
    });

    let mut graph = Graph::new();
    graph.provide(narrator.clone());

    assert_eq!(1, graph.unmet_dependencies());
    match &graph.errors()[0] {
        ResolveError::Unmet { path, .. } => {
            assert_eq!(".voice.speaker", path.to_string());
        }
        error => panic!("unexpected error: {}", error),
    }

    graph.provide(Object::handle(shared(Parrot)));
    let spoken = narrator.with_inner(|narrator| {
        narrator
            .voice
            .speaker
            .as_ref()
            .map(|speaker| speaker.with_inner(|speaker| speaker.speak()))
    });
    assert_eq!(Some(String::from("squawk")), spoken);
}

#[test]
fn compatible_structures_are_crossed() {
    let alpha = shared(Alpha { peer: None });
    let beta = shared(Beta { peer: None });

    let mut graph = Graph::new();
    graph.provide(alpha.clone());
    graph.provide(beta.clone());
    graph.assert().unwrap();

    let alpha_peer = alpha.with_inner(|alpha| {
        alpha
            .peer
            .as_ref()
            .map(|peer| peer.with_inner(|peer| peer.id()))
    });
    let beta_peer = beta.with_inner(|beta| {
        beta.peer.as_ref().map(|peer| peer.with_inner(|peer| peer.id()))
    });

    assert_eq!(Some("beta"), alpha_peer);
    assert_eq!(Some("alpha"), beta_peer);
}

#[test]
fn untagged_fields_are_ignored() {
    let mut graph = Graph::new();
    graph.provide(shared(Plain { f: String::new() }));

    assert_eq!(0, graph.unmet_dependencies());
    assert!(graph.errors().is_empty());
    assert!(graph
        .node(TypeInfo::of::<Plain>())
        .unwrap()
        .dependencies()
        .is_empty());
}

#[test]
fn tagged_fields_are_filled_once_available() {
    let tagged = shared(Tagged { f: String::new() });

    let mut graph = Graph::new();
    graph.provide(tagged.clone());
    assert_eq!(1, graph.unmet_dependencies());
    assert_eq!(1, graph.errors().len());

    graph.provide(constant(String::from("x")));
    assert_eq!(0, graph.unmet_dependencies());
    assert_eq!("x", tagged.with_inner(|tagged| tagged.f.clone()));
}

#[test]
fn datasource_values_fill_keyed_fields() {
    let source = MemorySource::new();
    source.insert("a.b", 10);

    let limits = shared(Limits { max: 0 });
    let mut graph = Graph::new();
    graph.provide(limits.clone());
    assert_eq!(1, graph.unmet_dependencies());

    graph.add_datasource(source).unwrap();
    assert_eq!(0, graph.unmet_dependencies());
    assert_eq!(10, limits.with_inner(|limits| limits.max));
}

#[test]
fn datasources_take_precedence_over_registered_objects() {
    let source = MemorySource::new();
    source.insert("counter.start", 5_i32);

    let counter = shared(Counter { start: 0 });
    let mut graph = Graph::new();
    graph.add_datasource(source).unwrap();
    graph.provide(constant(9_i32));
    graph.provide(counter.clone());

    assert_eq!(5, counter.with_inner(|counter| counter.start));
}

#[test]
fn readers_are_tried_in_order() {
    let first = MemorySource::new();
    let second = MemorySource::new();
    second.insert("a.b", 2_i64);
    let third = MemorySource::new();
    third.insert("a.b", 3_i64);

    let limits = shared(Limits { max: 0 });
    let mut graph = Graph::new();
    graph.add_datasources(vec![first, second, third]).unwrap();
    graph.provide(limits.clone());

    assert_eq!(2, limits.with_inner(|limits| limits.max));
}

#[test]
fn unconvertible_datasource_values_fall_back_to_the_graph() {
    let counter = shared(Counter { start: 0 });
    let mut graph = Graph::new();
    graph.add_datasource(Wrong).unwrap();
    graph.provide(counter.clone());
    assert_eq!(1, graph.unmet_dependencies());

    graph.provide(constant(4_i32));
    assert_eq!(4, counter.with_inner(|counter| counter.start));
}

#[test]
#[traced_test]
fn mistyped_datasource_values_are_logged() {
    let counter = shared(Counter { start: 0 });
    let mut graph = Graph::new();
    graph.add_datasource(Wrong).unwrap();
    graph.provide(counter.clone());

    assert_eq!(1, graph.unmet_dependencies());
    assert!(logs_contain("Datasource value has the wrong type"));
    assert!(logs_contain("counter.start"));
    assert!(logs_contain("i32"));
}

#[test]
fn registered_values_are_written_through() {
    let recorder = Svc::new(Writer(Recorder::default()));

    let counter = shared(Counter { start: 0 });
    let mut graph = Graph::new();
    graph.add_datasource(recorder.clone()).unwrap();
    graph.provide(constant(5_i32));
    graph.provide(counter.clone());

    assert_eq!(5, counter.with_inner(|counter| counter.start));
    assert_eq!(
        vec![(String::from("counter.start"), Some(5_i32))],
        recorder.0.writes::<i32>()
    );
}

#[test]
fn datasource_values_are_written_through() {
    let source = MemorySource::new();
    source.insert("a.b", 10_i32);
    let recorder = Svc::new(Writer(Recorder::default()));

    let limits = shared(Limits { max: 0 });
    let mut graph = Graph::new();
    graph.add_datasource(source).unwrap();
    graph.add_datasource(recorder.clone()).unwrap();
    graph.provide(limits.clone());

    assert_eq!(
        vec![(String::from("a.b"), Some(10_i64))],
        recorder.0.writes::<i64>()
    );
}

#[test]
#[traced_test]
fn failed_writes_are_logged() {
    let counter = shared(Counter { start: 0 });
    let mut graph = Graph::new();
    graph.add_datasource(Writer(Broken)).unwrap();
    graph.provide(constant(5_i32));
    graph.provide(counter.clone());

    assert_eq!(5, counter.with_inner(|counter| counter.start));
    assert!(graph.errors().is_empty());
    assert!(logs_contain("Failed to write to datasource"));
    assert!(logs_contain("disk full"));
}

#[test]
fn invalid_datasources_are_rejected() {
    let mut graph = Graph::new();
    match graph.add_datasource(Inert) {
        Err(InjectError::InvalidDatasource { type_info })
            if type_info == TypeInfo::of::<Inert>() => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("inert datasource should be rejected"),
    }

    let mut builder = Graph::builder();
    builder.add_datasource(MemorySource::new());
    builder.add_datasource(Source::from(Inert));
    assert!(builder.build().is_err());
}

#[test]
fn hidden_fields_are_not_writable() {
    let vault = shared(Vault {
        secret: 0,
        inner: Inner::default(),
        count: 0,
    });

    let mut graph = Graph::new();
    graph.provide(vault.clone());
    graph.provide(constant(8_i32));
    assert_eq!(0, graph.unmet_dependencies());

    let node = graph.node_mut(TypeInfo::of::<Vault>()).unwrap();
    node.add_dependency(Dependency::new(
        StructPath::from(".secret"),
        TypeInfo::of::<i32>(),
        Vec::new(),
    ));
    node.add_dependency(Dependency::new(
        StructPath::from(".inner.value"),
        TypeInfo::of::<i32>(),
        Vec::new(),
    ));
    graph.connect();

    assert_eq!(2, graph.errors().len());
    assert_eq!(0, graph.unmet_dependencies());
    assert!(graph
        .errors()
        .iter()
        .all(|error| matches!(error, ResolveError::NotWritable { .. })));
    vault.with_inner(|vault| {
        assert_eq!(0, vault.secret);
        assert_eq!(0, vault.inner.value);
        assert_eq!(8, vault.count);
    });
    assert!(graph.assert().is_err());
}

#[test]
fn broken_paths_are_reported() {
    let mut graph = Graph::new();
    graph.provide(shared(Vault {
        secret: 0,
        inner: Inner::default(),
        count: 1,
    }));

    let node = graph.node_mut(TypeInfo::of::<Vault>()).unwrap();
    node.add_dependency(Dependency::new(
        StructPath::from(".missing"),
        TypeInfo::of::<i32>(),
        Vec::new(),
    ));
    node.add_dependency(Dependency::new(
        StructPath::from(".count.value"),
        TypeInfo::of::<i32>(),
        Vec::new(),
    ));
    graph.connect();

    match graph.errors() {
        [ResolveError::FieldNotFound { segment, .. }, ResolveError::NotAStructure { path, .. }] =>
        {
            assert_eq!("missing", segment.as_str());
            assert_eq!(".count.value", path.to_string());
        }
        errors => panic!("unexpected errors: {:?}", errors),
    }
}

/// A structure whose shape is declared by hand. The `total` field is derived
/// from the others and can't be written to.
struct Tally {
    pub items: u32,
    pub total: u32,
}

impl Structure for Tally {
    fn fields() -> Vec<Field> {
        vec![
            Field::inject::<u32>("items", true, &["tally.items"]),
            Field::inject::<u32>("total", true, &[]),
        ]
    }

    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>> {
        match name {
            "items" => {
                Some(FieldMut::new(true, FieldAccess::Slot(&mut self.items)))
            }
            "total" => Some(FieldMut::new(true, FieldAccess::Opaque)),
            _ => None,
        }
    }
}

#[test]
fn hand_written_structures_are_supported() {
    let source = MemorySource::new();
    source.insert("tally.items", 3_u32);

    let tally = shared(Tally { items: 0, total: 0 });
    let mut graph = Graph::new();
    graph.add_datasource(source).unwrap();
    graph.provide(tally.clone());

    assert_eq!(3, tally.with_inner(|tally| tally.items));
    assert_eq!(0, tally.with_inner(|tally| tally.total));
    match graph.errors() {
        [ResolveError::NotWritable { path, .. }] => {
            assert_eq!(".total", path.to_string());
        }
        errors => panic!("unexpected errors: {:?}", errors),
    }
}

#[test]
fn invoke_resolves_interfaces() {
    let mut graph = Graph::new();
    graph.provide(Object::handle(shared(Parrot)));

    let spoken = graph
        .invoke(
            |speaker: Shared<dyn Speaker>| {
                speaker.with_inner(|speaker| speaker.speak())
            },
            &[],
        )
        .unwrap();
    assert_eq!("squawk", spoken);
}

#[test]
fn invoke_prefers_extras() {
    let mut graph = Graph::new();
    graph.provide(constant(1_u16));

    let sum = graph
        .invoke(|a: u16, b: u32| u32::from(a) + b, &[constant(10_u32)])
        .unwrap();
    assert_eq!(11, sum);

    match graph.invoke(|_: String| (), &[constant(10_u32)]) {
        Err(InjectError::MissingArgument { index, type_info })
            if index == 0 && type_info == TypeInfo::of::<String>() => {}
        Err(error) => Err(error).unwrap(),
        Ok(_) => unreachable!("no string was available"),
    }
}

#[test]
fn builder_wires_everything_in_one_pass() {
    let source = MemorySource::new();
    source.insert("a.b", 42_i64);

    let limits = shared(Limits { max: 0 });
    let tagged = shared(Tagged { f: String::new() });

    let mut builder = Graph::builder();
    builder
        .provide(limits.clone())
        .provide(tagged.clone())
        .provide(constant(String::from("built")))
        .add_datasource(source);

    let graph = builder.build().unwrap();
    graph.assert().unwrap();
    assert_eq!(3, graph.len());
    assert_eq!(42, limits.with_inner(|limits| limits.max));
    assert_eq!("built", tagged.with_inner(|tagged| tagged.f.clone()));
}
