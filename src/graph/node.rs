use crate::{find_dependencies, Dependency, Object, StructPath};

/// A registered object along with the fields it requests.
#[derive(Clone, Debug)]
pub struct Node {
    name: &'static str,
    object: Object,
    dependencies: Vec<Dependency>,
}

impl Node {
    /// Creates a node, extracting the object's requested fields if it is a
    /// structure.
    #[must_use]
    pub fn new(object: Object) -> Self {
        let mut dependencies = Vec::new();
        find_dependencies(&object.fields(), &mut dependencies, &StructPath::empty());

        Node {
            name: object.concrete_info().name(),
            object,
            dependencies,
        }
    }

    /// The name of the object's concrete type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn object(&self) -> &Object {
        &self.object
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Adds a dependency that wasn't derived from the object's fields. The
    /// path is still checked against the live object during each connection
    /// pass.
    pub fn add_dependency(&mut self, dependency: Dependency) {
        self.dependencies.push(dependency);
    }
}
