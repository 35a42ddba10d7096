use crate::{Field, FieldKind, StructPath, Structure, TypeInfo};

/// A single requested field of a registered object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dependency {
    path: StructPath,
    type_info: TypeInfo,
    datasource_paths: Vec<String>,
}

impl Dependency {
    #[must_use]
    pub fn new(
        path: StructPath,
        type_info: TypeInfo,
        datasource_paths: Vec<String>,
    ) -> Self {
        Dependency {
            path,
            type_info,
            datasource_paths,
        }
    }

    /// Finds every requested field of `T`, including those inside nested
    /// structures.
    #[must_use]
    pub fn extract<T: Structure>() -> Vec<Dependency> {
        let mut dependencies = Vec::new();
        find_dependencies(&T::fields(), &mut dependencies, &StructPath::empty());
        dependencies
    }

    /// Where the field lives, relative to the owning object.
    #[must_use]
    pub fn path(&self) -> &StructPath {
        &self.path
    }

    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    /// The datasource keys to try, in order, before falling back to
    /// registered objects.
    #[must_use]
    pub fn datasource_paths(&self) -> &[String] {
        &self.datasource_paths
    }
}

pub(crate) fn find_dependencies(
    fields: &[Field],
    dependencies: &mut Vec<Dependency>,
    base: &StructPath,
) {
    for field in fields {
        if !field.exported() {
            continue;
        }

        let branch = base.branch(field.name());
        match field.kind() {
            FieldKind::Opaque => {}
            FieldKind::Nested(fields) => {
                find_dependencies(&fields(), dependencies, &branch);
            }
            FieldKind::Inject(keys) => dependencies.push(Dependency::new(
                branch,
                field.type_info(),
                keys.clone(),
            )),
        }
    }
}
