use crate::{
    Dependency, DynSvc, FieldAccess, Graph, Node, ResolveError, Slot,
    StructPath, Structure, TypeInfo,
};
use tracing::{debug, trace, warn};

/// Where a dependency is being resolved, for error reporting.
struct Target<'a> {
    owner: TypeInfo,
    dependency: &'a Dependency,
}

impl Target<'_> {
    fn path(&self) -> StructPath {
        self.dependency.path().clone()
    }
}

impl Graph {
    /// Runs a connection pass, filling every unset requested field that can
    /// be filled. This happens automatically whenever objects or datasources
    /// are added, so it only needs to be called by hand after adding
    /// dependencies through [`node_mut`](Self::node_mut).
    ///
    /// Problems are recorded rather than returned; see
    /// [`errors`](Self::errors) and [`assert`](Self::assert).
    pub fn connect(&mut self) {
        let mut errors = Vec::new();
        for node in self.nodes.values() {
            for dependency in node.dependencies() {
                if let Err(error) = self.assign_value_to_node(node, dependency)
                {
                    trace!(error = %error, "Unresolved dependency");
                    errors.push(error);
                }
            }
        }

        self.unmet_dependencies =
            errors.iter().filter(|error| error.is_unmet()).count();
        self.errors = errors;
        debug!(
            nodes = self.nodes.len(),
            unmet = self.unmet_dependencies,
            errors = self.errors.len(),
            "Connected graph"
        );
    }

    fn assign_value_to_node(
        &self,
        node: &Node,
        dependency: &Dependency,
    ) -> Result<(), ResolveError> {
        let object = node.object();
        let target = Target {
            owner: object.concrete_info(),
            dependency,
        };

        let mut result = Err(ResolveError::NotAStructure {
            owner: target.owner,
            path: StructPath::empty(),
        });
        let mut ancestors = vec![object.id()];
        object.visit(&mut |root| {
            result = self.walk(
                root,
                dependency.path(),
                true,
                &mut ancestors,
                &target,
            );
        });

        result
    }

    /// Follows `path` down from `current` and fills the field at its end.
    fn walk(
        &self,
        current: &mut dyn Structure,
        path: &StructPath,
        writable: bool,
        ancestors: &mut Vec<usize>,
        target: &Target<'_>,
    ) -> Result<(), ResolveError> {
        let (segment, rest) = path.shift();
        let field = current.field_mut(&segment).ok_or_else(|| {
            ResolveError::FieldNotFound {
                owner: target.owner,
                path: target.path(),
                segment: segment.clone(),
            }
        })?;

        let writable = writable && field.exported();
        match (field.into_access(), rest.is_empty()) {
            (FieldAccess::Slot(slot), true) => {
                self.fill(slot, writable, ancestors, target)
            }
            (FieldAccess::Nested(nested), false) => {
                let address = std::ptr::from_ref(&*nested).cast::<()>();
                ancestors.push(address as usize);
                self.walk(nested, &rest, writable, ancestors, target)
            }
            (FieldAccess::Nested(_) | FieldAccess::Opaque, true) => {
                Err(ResolveError::NotWritable {
                    owner: target.owner,
                    path: target.path(),
                })
            }
            (FieldAccess::Slot(_) | FieldAccess::Opaque, false) => {
                Err(ResolveError::NotAStructure {
                    owner: target.owner,
                    path: target.path(),
                })
            }
        }
    }

    fn fill(
        &self,
        slot: &mut dyn Slot,
        writable: bool,
        ancestors: &[usize],
        target: &Target<'_>,
    ) -> Result<(), ResolveError> {
        if !slot.vacant() {
            return Ok(());
        }

        if !writable {
            return Err(ResolveError::NotWritable {
                owner: target.owner,
                path: target.path(),
            });
        }

        let keys = target.dependency.datasource_paths();
        for key in keys {
            for source in &self.datasource_readers {
                let reader = match source.reader() {
                    Some(reader) => reader,
                    None => continue,
                };

                match reader.read(key) {
                    Ok(value) if slot.convert(&value) => {
                        trace!(
                            owner = target.owner.name(),
                            path = %target.dependency.path(),
                            key = key.as_str(),
                            datasource = source.type_info().name(),
                            "Assigned datasource value"
                        );
                        self.write_through(std::slice::from_ref(key), &slot.value());
                        return Ok(());
                    }
                    Ok(_) => debug!(
                        owner = target.owner.name(),
                        path = %target.dependency.path(),
                        key = key.as_str(),
                        datasource = source.type_info().name(),
                        expected = slot.type_info().name(),
                        "Datasource value has the wrong type"
                    ),
                    Err(error) => trace!(
                        key = key.as_str(),
                        datasource = source.type_info().name(),
                        error = %error,
                        "Datasource read failed"
                    ),
                }
            }
        }

        for candidate in self.nodes.values() {
            let object = candidate.object();
            if ancestors.contains(&object.id()) {
                continue;
            }

            if slot.assign(object.as_dyn()) {
                trace!(
                    owner = target.owner.name(),
                    path = %target.dependency.path(),
                    object = candidate.name(),
                    "Assigned registered object"
                );
                self.write_through(keys, &slot.value());
                return Ok(());
            }
        }

        Err(ResolveError::Unmet {
            owner: target.owner,
            path: target.path(),
            dependency: target.dependency.type_info(),
        })
    }

    fn write_through(&self, keys: &[String], value: &DynSvc) {
        for key in keys {
            for source in &self.datasource_writers {
                let writer = match source.writer() {
                    Some(writer) => writer,
                    None => continue,
                };

                if let Err(error) = writer.write(key, DynSvc::clone(value)) {
                    warn!(
                        key = key.as_str(),
                        datasource = source.type_info().name(),
                        error = %error,
                        "Failed to write to datasource"
                    );
                }
            }
        }
    }
}
