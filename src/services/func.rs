use crate::{Assignable, Graph, InjectResult};

/// A function whose arguments can be filled in from a [`Graph`]. All
/// functions of arity 12 or less are automatically injectable if every
/// argument is [`Assignable`].
///
/// ```
/// use graph_injector::{constant, Graph, InjectFn};
///
/// fn describe(name: String, port: u16) -> String {
///     format!("{}:{}", name, port)
/// }
///
/// let mut graph = Graph::new();
/// graph.provide(constant(String::from("localhost")));
///
/// let description = describe
///     .invoke(&graph, &[constant(8080_u16)])
///     .unwrap();
/// assert_eq!("localhost:8080", description);
/// ```
///
/// # Type parameters
/// * `D` - Arguments of this function as a tuple.
pub trait InjectFn<D> {
    /// The function's return type.
    type Output;

    /// Resolves each argument and calls the function. Arguments are taken
    /// from `extras` first, then from the graph's registered objects. If any
    /// argument can't be resolved, the function is not called.
    fn invoke(
        self,
        graph: &Graph,
        extras: &[crate::Object],
    ) -> InjectResult<Self::Output>;
}

macro_rules! impl_inject_function {
    () => {
        impl_inject_function!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_inject_function!(@impl ($first $(, $rest)*));
        impl_inject_function!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        impl <F, R $(, $type_name)*> InjectFn<($($type_name,)*)> for F
        where
            F: FnOnce($($type_name),*) -> R,
            $($type_name: Assignable,)*
        {
            type Output = R;

            #[allow(unused_variables, unused_mut, unused_assignments, non_snake_case)]
            fn invoke(
                self,
                graph: &Graph,
                extras: &[crate::Object],
            ) -> InjectResult<R> {
                let mut index = 0;
                $(
                    let $type_name = graph.resolve_argument::<$type_name>(index, extras)?;
                    index += 1;
                )*

                Ok(self($($type_name),*))
            }
        }
    };
}

impl_inject_function!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
