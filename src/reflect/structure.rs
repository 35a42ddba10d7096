use crate::{Assignable, Service, Slot, TypeInfo};
use std::any::Any;

/// Describes the shape of a struct so the graph can find and fill its
/// requested fields. This is usually implemented with the
/// [`structure!`](crate::structure) macro, but can be implemented by hand for
/// types that need custom field access.
pub trait Structure: Service {
    /// Metadata for every field of the struct, in declaration order.
    fn fields() -> Vec<Field>
    where
        Self: Sized;

    /// Live access to the field called `name`, if there is one.
    fn field_mut(&mut self, name: &str) -> Option<FieldMut<'_>>;
}

/// Static metadata for a single field.
#[derive(Clone, Debug)]
pub struct Field {
    name: &'static str,
    exported: bool,
    type_info: TypeInfo,
    kind: FieldKind,
}

#[derive(Clone, Debug)]
pub enum FieldKind {
    /// A field the graph never looks at.
    Opaque,

    /// A requested field, along with the datasource keys to try for it in
    /// order. An empty list means only registered objects are considered.
    Inject(Vec<String>),

    /// A struct-valued field whose own requests belong to the parent.
    Nested(fn() -> Vec<Field>),
}

impl Field {
    #[must_use]
    pub fn opaque<T: ?Sized + Any>(
        name: &'static str,
        exported: bool,
    ) -> Self {
        Field {
            name,
            exported,
            type_info: TypeInfo::of::<T>(),
            kind: FieldKind::Opaque,
        }
    }

    /// A requested field. Each key may itself hold several comma-separated
    /// keys; surrounding whitespace and empty entries are dropped.
    #[must_use]
    pub fn inject<T: Assignable>(
        name: &'static str,
        exported: bool,
        keys: &[&str],
    ) -> Self {
        let keys = keys
            .iter()
            .flat_map(|key| key.split(','))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
            .collect();

        Field {
            name,
            exported,
            type_info: TypeInfo::of::<T>(),
            kind: FieldKind::Inject(keys),
        }
    }

    #[must_use]
    pub fn nested<T: Structure>(name: &'static str, exported: bool) -> Self {
        Field {
            name,
            exported,
            type_info: TypeInfo::of::<T>(),
            kind: FieldKind::Nested(T::fields),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the field is visible outside its struct. Hidden fields are
    /// never filled in.
    #[must_use]
    pub fn exported(&self) -> bool {
        self.exported
    }

    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// Live access to one field of a struct.
pub struct FieldMut<'a> {
    exported: bool,
    access: FieldAccess<'a>,
}

pub enum FieldAccess<'a> {
    Slot(&'a mut dyn Slot),
    Nested(&'a mut dyn Structure),
    Opaque,
}

impl<'a> FieldMut<'a> {
    #[must_use]
    pub fn new(exported: bool, access: FieldAccess<'a>) -> Self {
        FieldMut { exported, access }
    }

    #[must_use]
    pub fn exported(&self) -> bool {
        self.exported
    }

    #[must_use]
    pub fn into_access(self) -> FieldAccess<'a> {
        self.access
    }
}

/// Declares a struct along with its [`Structure`] implementation. Fields can
/// be marked to control how the graph treats them:
///
/// - `#[inject]`: the field is filled from registered objects.
/// - `#[inject("a.b", "c")]`: the field is filled from the listed datasource
///   keys first, then from registered objects.
/// - `#[nested]`: the field is itself a [`Structure`] whose requests are
///   filled as part of this struct.
///
/// Unmarked fields are left alone, and only `pub` fields are ever filled in.
/// Any other attribute on a field, doc comments included, is kept on the
/// generated field. A `#[cfg(...)]` on a field also applies to its entry in
/// the generated [`Structure`] implementation.
///
/// ```
/// use graph_injector::{constant, shared, structure, Graph, LockExt};
///
/// structure! {
///     #[derive(Default)]
///     pub struct Settings {
///         /// How many times a request is retried.
///         #[inject("settings.retries")]
///         pub retries: u32,
///     }
/// }
///
/// structure! {
///     pub struct Client {
///         #[inject]
///         pub name: String,
///         #[nested]
///         pub settings: Settings,
///         cache: Vec<u8>,
///     }
/// }
///
/// let mut graph = Graph::new();
/// let client = shared(Client {
///     name: String::new(),
///     settings: Settings::default(),
///     cache: Vec::new(),
/// });
/// graph.provide(client.clone());
/// graph.provide(constant(String::from("client")));
///
/// assert_eq!("client", client.with_inner(|client| client.name.clone()));
/// assert_eq!(1, graph.unmet_dependencies());
/// ```
#[macro_export]
macro_rules! structure {
    (@describe [] $field:ident : $ty:ty, $exported:expr) => {
        $crate::Field::opaque::<$ty>(stringify!($field), $exported)
    };
    (@describe [inject] $field:ident : $ty:ty, $exported:expr) => {
        $crate::Field::inject::<$ty>(stringify!($field), $exported, &[])
    };
    (@describe [inject ($($key:literal),*)] $field:ident : $ty:ty, $exported:expr) => {
        $crate::Field::inject::<$ty>(stringify!($field), $exported, &[$($key),*])
    };
    (@describe [nested] $field:ident : $ty:ty, $exported:expr) => {
        $crate::Field::nested::<$ty>(stringify!($field), $exported)
    };
    (@access [] $place:expr) => {
        $crate::FieldAccess::Opaque
    };
    (@access [inject $($keys:tt)*] $place:expr) => {
        $crate::FieldAccess::Slot($place)
    };
    (@access [nested] $place:expr) => {
        $crate::FieldAccess::Nested($place)
    };

    // Field bodies are consumed one token tree at a time. The state is the
    // struct header, the finished fields, then the pending attributes, cfgs
    // and markers of the field being read.
    (@munch $header:tt [$($fields:tt)*] [] [] []) => {
        $crate::structure!(@emit $header $($fields)*);
    };
    (
        @munch $header:tt $fields:tt $attrs:tt $cfgs:tt [$($marker:tt)*]
        #[inject $(($($key:literal),* $(,)?))?]
        $($rest:tt)*
    ) => {
        $crate::structure!(
            @munch $header $fields $attrs $cfgs
            [$($marker)* inject $(($($key),*))?]
            $($rest)*
        );
    };
    (
        @munch $header:tt $fields:tt $attrs:tt $cfgs:tt [$($marker:tt)*]
        #[nested]
        $($rest:tt)*
    ) => {
        $crate::structure!(
            @munch $header $fields $attrs $cfgs [$($marker)* nested] $($rest)*
        );
    };
    (
        @munch $header:tt $fields:tt $attrs:tt [$($cfg:tt)*] $markers:tt
        #[cfg $predicate:tt]
        $($rest:tt)*
    ) => {
        $crate::structure!(
            @munch $header $fields $attrs [$($cfg)* $predicate] $markers
            $($rest)*
        );
    };
    (
        @munch $header:tt $fields:tt [$($attr:tt)*] $cfgs:tt $markers:tt
        #[$other:meta]
        $($rest:tt)*
    ) => {
        $crate::structure!(
            @munch $header $fields [$($attr)* #[$other]] $cfgs $markers
            $($rest)*
        );
    };
    (
        @munch $header:tt [$($fields:tt)*] $attrs:tt $cfgs:tt $markers:tt
        $field_vis:vis $field:ident : $ty:ty $(, $($rest:tt)*)?
    ) => {
        $crate::structure!(
            @munch $header
            [$($fields)* { $attrs $cfgs $markers $field_vis $field $ty }]
            [] [] []
            $($($rest)*)?
        );
    };

    (
        @emit [$(#[$attr:meta])* $vis:vis struct $name:ident]
        $({
            [$($field_attr:tt)*]
            [$($cfg:tt)*]
            [$($marker:tt)*]
            $field_vis:vis $field:ident $ty:ty
        })*
    ) => {
        $(#[$attr])*
        $vis struct $name {
            $(
                $($field_attr)*
                $(#[cfg $cfg])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::Structure for $name {
            fn fields() -> ::std::vec::Vec<$crate::Field> {
                #[allow(unused_mut)]
                let mut fields = ::std::vec::Vec::new();
                $(
                    $(#[cfg $cfg])*
                    fields.push($crate::structure!(
                        @describe [$($marker)*]
                        $field : $ty,
                        !stringify!($field_vis).is_empty()
                    ));
                )*
                fields
            }

            fn field_mut(
                &mut self,
                name: &str,
            ) -> ::std::option::Option<$crate::FieldMut<'_>> {
                match name {
                    $(
                        $(#[cfg $cfg])*
                        stringify!($field) => ::std::option::Option::Some(
                            $crate::FieldMut::new(
                                !stringify!($field_vis).is_empty(),
                                $crate::structure!(
                                    @access [$($marker)*]
                                    &mut self.$field
                                ),
                            ),
                        ),
                    )*
                    _ => ::std::option::Option::None,
                }
            }
        }
    };

    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::structure!(
            @munch [$(#[$attr])* $vis struct $name] [] [] [] [] $($body)*
        );
    };
}
