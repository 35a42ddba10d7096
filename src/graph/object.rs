use crate::{DynSvc, Field, Lock, LockExt, Service, Shared, Structure, Svc, TypeInfo};
use std::fmt::{Debug, Formatter};

/// Runs `visitor` against the live value of a shared object.
type Visit = fn(&DynSvc, &mut dyn FnMut(&mut dyn Structure)) -> bool;

#[derive(Clone, Copy)]
struct Shape {
    fields: fn() -> Vec<Field>,
    visit: Visit,
}

fn visit<T: Structure>(
    value: &DynSvc,
    visitor: &mut dyn FnMut(&mut dyn Structure),
) -> bool {
    match value.downcast_ref::<Lock<T>>() {
        Some(lock) => {
            lock.with_inner_mut(|inner| {
                let inner: &mut dyn Structure = inner;
                visitor(inner);
            });
            true
        }
        None => false,
    }
}

/// A value that can be registered with a [`Graph`](crate::Graph).
///
/// Objects created from a [`Shared`] handle of a [`Structure`] have their
/// requested fields filled in by the graph. Any other object is only ever
/// used to fill in fields of other objects.
#[derive(Clone)]
pub struct Object {
    value: DynSvc,
    registration_info: TypeInfo,
    concrete_info: TypeInfo,
    shape: Option<Shape>,
}

impl Object {
    /// A plain value. Fields of type `T` (or `Option<T>`) receive clones of
    /// it.
    #[must_use]
    pub fn value<T: Service>(value: T) -> Self {
        Object {
            value: Svc::new(value),
            registration_info: TypeInfo::of::<T>(),
            concrete_info: TypeInfo::of::<T>(),
            shape: None,
        }
    }

    /// A shared structure whose requested fields the graph fills in.
    #[must_use]
    pub fn structure<T: Structure>(handle: Shared<T>) -> Self {
        Object {
            value: handle,
            registration_info: TypeInfo::of::<Shared<T>>(),
            concrete_info: TypeInfo::of::<T>(),
            shape: Some(Shape {
                fields: T::fields,
                visit: visit::<T>,
            }),
        }
    }

    /// A shared value without requested fields of its own. Fields of type
    /// `Shared<T>`, or `Shared<dyn Trait>` for any interface `T` implements,
    /// receive this handle.
    #[must_use]
    pub fn handle<T: Service>(handle: Shared<T>) -> Self {
        Object {
            value: handle,
            registration_info: TypeInfo::of::<Shared<T>>(),
            concrete_info: TypeInfo::of::<T>(),
            shape: None,
        }
    }

    /// The registration type and the concrete type of this object. Objects
    /// registered through a [`Shared`] handle have the handle as their
    /// registration type and the type it points to as their concrete type.
    #[must_use]
    pub fn classify(&self) -> (TypeInfo, TypeInfo) {
        (self.registration_info, self.concrete_info)
    }

    #[must_use]
    pub fn registration_info(&self) -> TypeInfo {
        self.registration_info
    }

    #[must_use]
    pub fn concrete_info(&self) -> TypeInfo {
        self.concrete_info
    }

    #[must_use]
    pub fn as_dyn(&self) -> &DynSvc {
        &self.value
    }

    /// Whether the graph looks for requested fields in this object.
    #[must_use]
    pub fn is_structure(&self) -> bool {
        self.shape.is_some()
    }

    /// An identity for the object's value. Clones of an object, and objects
    /// created from clones of the same handle, share an identity.
    #[must_use]
    pub fn id(&self) -> usize {
        Svc::as_ptr(&self.value) as *const () as usize
    }

    pub(crate) fn fields(&self) -> Vec<Field> {
        self.shape.map(|shape| (shape.fields)()).unwrap_or_default()
    }

    /// Runs `visitor` against the object's live value. Returns `false` if
    /// the object isn't a structure.
    pub(crate) fn visit(
        &self,
        visitor: &mut dyn FnMut(&mut dyn Structure),
    ) -> bool {
        match self.shape {
            Some(shape) => (shape.visit)(&self.value, visitor),
            None => false,
        }
    }
}

impl<T: Structure> From<Shared<T>> for Object {
    fn from(handle: Shared<T>) -> Self {
        Object::structure(handle)
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("registration_info", &self.registration_info)
            .field("concrete_info", &self.concrete_info)
            .field("is_structure", &self.is_structure())
            .finish()
    }
}
