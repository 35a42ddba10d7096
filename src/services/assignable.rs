use crate::{DynSvc, Interface, Service, Shared, Svc, TypeInfo};

/// A type that can be filled in from the graph, either as an injected field
/// or as an argument to an invoked function.
///
/// Registered objects are matched with [`assign_from`](Self::assign_from),
/// which only accepts values of a compatible type. Values read from a
/// datasource go through [`convert_from`](Self::convert_from) instead, which
/// may also perform lossless conversions (for example, reading an `i32` into
/// an `i64` field).
pub trait Assignable: Service + Clone {
    /// Attempts to produce a value of this type from a registered object.
    fn assign_from(value: &DynSvc) -> Option<Self>;

    /// Attempts to produce a value of this type from a datasource value.
    fn convert_from(value: &DynSvc) -> Option<Self> {
        Self::assign_from(value)
    }

    /// Whether this value is still unset. Unset fields are the only fields
    /// the graph will fill in.
    fn is_unset(&self) -> bool;

    /// Erases this value so it can be handed to a datasource writer.
    fn erase(&self) -> DynSvc {
        Svc::new(self.clone())
    }
}

impl<A: Assignable> Assignable for Option<A> {
    fn assign_from(value: &DynSvc) -> Option<Self> {
        A::assign_from(value).map(Some)
    }

    fn convert_from(value: &DynSvc) -> Option<Self> {
        A::convert_from(value).map(Some)
    }

    fn is_unset(&self) -> bool {
        self.is_none()
    }

    fn erase(&self) -> DynSvc {
        match self {
            Some(value) => value.erase(),
            None => Svc::new(self.clone()),
        }
    }
}

impl<I: ?Sized + Interface> Assignable for Shared<I> {
    fn assign_from(value: &DynSvc) -> Option<Self> {
        I::from_dyn(value)
    }

    fn convert_from(value: &DynSvc) -> Option<Self> {
        I::from_dyn(value)
            .or_else(|| value.downcast_ref::<Shared<I>>().cloned())
    }

    fn is_unset(&self) -> bool {
        false
    }
}

fn widen(value: &DynSvc) -> Option<i128> {
    macro_rules! widen_from {
        ($value:ident; $($int:ty),*) => {
            $(
                if let Some(value) = $value.downcast_ref::<$int>() {
                    return Some(i128::from(*value));
                }
            )*
        };
    }

    widen_from!(value; i8, i16, i32, i64, u8, u16, u32, u64);
    if let Some(value) = value.downcast_ref::<isize>() {
        return i128::try_from(*value).ok();
    }
    if let Some(value) = value.downcast_ref::<usize>() {
        return i128::try_from(*value).ok();
    }

    None
}

macro_rules! assignable_int {
    ($($int:ty),*) => {
        $(
            impl Assignable for $int {
                fn assign_from(value: &DynSvc) -> Option<Self> {
                    value.downcast_ref::<$int>().copied()
                }

                fn convert_from(value: &DynSvc) -> Option<Self> {
                    widen(value).and_then(|value| <$int>::try_from(value).ok())
                }

                fn is_unset(&self) -> bool {
                    *self == 0
                }
            }
        )*
    };
}

assignable_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! assignable_float {
    ($($float:ty),*) => {
        $(
            impl Assignable for $float {
                fn assign_from(value: &DynSvc) -> Option<Self> {
                    value.downcast_ref::<$float>().copied()
                }

                #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                fn convert_from(value: &DynSvc) -> Option<Self> {
                    if let Some(value) = value.downcast_ref::<f64>() {
                        return Some(*value as $float);
                    }
                    if let Some(value) = value.downcast_ref::<f32>() {
                        return Some(*value as $float);
                    }

                    widen(value).map(|value| value as $float)
                }

                fn is_unset(&self) -> bool {
                    *self == 0.0
                }
            }
        )*
    };
}

assignable_float!(f32, f64);

impl Assignable for String {
    fn assign_from(value: &DynSvc) -> Option<Self> {
        value.downcast_ref::<String>().cloned()
    }

    fn convert_from(value: &DynSvc) -> Option<Self> {
        Self::assign_from(value).or_else(|| {
            value
                .downcast_ref::<&'static str>()
                .map(|value| (*value).to_owned())
        })
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl Assignable for &'static str {
    fn assign_from(value: &DynSvc) -> Option<Self> {
        value.downcast_ref::<&'static str>().copied()
    }

    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// Implements [`Assignable`] for value types which match registered objects
/// by exact type and are unset when equal to their [`Default`] value.
///
/// ```
/// use graph_injector::assignable;
///
/// #[derive(Clone, Debug, Default, PartialEq)]
/// struct Port(u16);
///
/// assignable!(Port);
/// ```
#[macro_export]
macro_rules! assignable {
    ($($type:ty),* $(,)?) => {
        $(
            impl $crate::Assignable for $type {
                fn assign_from(value: &$crate::DynSvc) -> Option<Self> {
                    value.downcast_ref::<$type>().cloned()
                }

                fn is_unset(&self) -> bool {
                    *self == <$type as ::std::default::Default>::default()
                }
            }
        )*
    };
}

assignable!(bool, char);

/// A type-erased view of a single injectable field.
pub trait Slot {
    /// The type of the field.
    fn type_info(&self) -> TypeInfo;

    /// Whether the field is unset and may be filled in.
    fn vacant(&self) -> bool;

    /// Fills the field from a registered object. Returns whether the object
    /// was compatible.
    fn assign(&mut self, value: &DynSvc) -> bool;

    /// Fills the field from a datasource value. Returns whether the value
    /// could be converted.
    fn convert(&mut self, value: &DynSvc) -> bool;

    /// The current value of the field, erased for a datasource writer.
    fn value(&self) -> DynSvc;
}

impl<A: Assignable> Slot for A {
    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<A>()
    }

    fn vacant(&self) -> bool {
        self.is_unset()
    }

    fn assign(&mut self, value: &DynSvc) -> bool {
        match A::assign_from(value) {
            Some(value) => {
                *self = value;
                true
            }
            None => false,
        }
    }

    fn convert(&mut self, value: &DynSvc) -> bool {
        match A::convert_from(value) {
            Some(value) => {
                *self = value;
                true
            }
            None => false,
        }
    }

    fn value(&self) -> DynSvc {
        self.erase()
    }
}

#[cfg(test)]
mod tests {
    use crate::{shared, Assignable, DynSvc, Shared, Slot, Svc};

    #[test]
    fn zero_values_are_unset() {
        assert!(0_i32.is_unset());
        assert!(!7_i32.is_unset());
        assert!(0.0_f64.is_unset());
        assert!(false.is_unset());
        assert!(!true.is_unset());
        assert!('\0'.is_unset());
        assert!(String::new().is_unset());
        assert!(!String::from("x").is_unset());
        assert!(None::<i32>.is_unset());
        assert!(!Some(0_i32).is_unset());
        assert!(!shared(0_i32).is_unset());
    }

    #[test]
    fn registered_values_match_exact_types() {
        let value: DynSvc = Svc::new(10_i32);
        assert_eq!(Some(10), i32::assign_from(&value));
        assert_eq!(None, i64::assign_from(&value));
        assert_eq!(Some(Some(10)), Option::<i32>::assign_from(&value));
    }

    #[test]
    fn datasource_values_convert_between_integers() {
        let value: DynSvc = Svc::new(10_i32);
        assert_eq!(Some(10), i64::convert_from(&value));
        assert_eq!(Some(10), u8::convert_from(&value));
        assert_eq!(Some(10.0), f64::convert_from(&value));

        let negative: DynSvc = Svc::new(-1_i64);
        assert_eq!(None, u32::convert_from(&negative));

        let text: DynSvc = Svc::new("hello");
        assert_eq!(Some(String::from("hello")), String::convert_from(&text));
        assert_eq!(None, i32::convert_from(&text));
    }

    #[test]
    fn shared_slots_receive_the_same_handle() {
        let handle = shared(5_u8);
        let erased: DynSvc = handle.clone();

        let mut field: Option<Shared<u8>> = None;
        assert!(Slot::vacant(&field));
        assert!(Slot::assign(&mut field, &erased));
        assert!(Svc::ptr_eq(&handle, field.as_ref().unwrap()));
        assert!(!Slot::vacant(&field));

        let written = Slot::value(&field);
        let mut copy: Option<Shared<u8>> = None;
        assert!(Slot::convert(&mut copy, &written));
        assert!(Svc::ptr_eq(&handle, copy.as_ref().unwrap()));
    }
}
