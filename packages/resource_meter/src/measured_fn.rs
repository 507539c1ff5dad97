use std::fmt;
use std::sync::atomic::{self, AtomicU64};

use crate::collector::Scope;
use crate::{Collector, Probe, Result};

/// A function that can be called with its arguments packed into a tuple.
///
/// Implemented for every `Fn` of up to six arguments, so [`MeasuredFn::call()`] accepts `()` for
/// a function without arguments, `(a,)` for one argument, `(a, b)` for two and so on.
pub trait Invoke<Args> {
    /// What the function returns.
    type Output;

    /// Calls the function.
    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg),*> Invoke<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case, reason = "type parameter names double as argument bindings")]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Out {
                self($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, F);

/// A function wrapped by [`Collector::measure_function()`]; every call through
/// [`call()`](Self::call) is measured.
///
/// The wrapper can be shared between threads when the function can. Wrapping the same callable
/// in several collectors composes: each measures the calls that pass through it.
///
/// # Examples
///
/// ```
/// use resource_meter::{CallCollector, TimeCollector};
///
/// let time = TimeCollector::default();
/// let calls = CallCollector::default();
///
/// let square = time.measure_function("square", |x: u64| x * x);
/// let counted = calls.measure_function("square", move |x: u64| square.call((x,)));
///
/// assert_eq!(counted.call((7,)).unwrap().unwrap(), 49);
///
/// assert_eq!(time.get_records().len(), 1);
/// assert_eq!(calls.get_records()[0].metrics().get_f64("call_count"), Some(1.0));
/// ```
pub struct MeasuredFn<P: Probe, F> {
    collector: Collector<P>,
    name: String,
    function: F,
    invocations: AtomicU64,
}

impl<P: Probe, F> MeasuredFn<P, F> {
    pub(crate) fn new(collector: Collector<P>, name: String, function: F) -> Self {
        Self {
            collector,
            name,
            function,
            invocations: AtomicU64::new(0),
        }
    }

    /// The label of the records this wrapper produces.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many times [`call()`](Self::call) has been invoked, including calls whose
    /// measurement could not start.
    #[must_use]
    pub fn invocations(&self) -> u64 {
        self.invocations.load(atomic::Ordering::Relaxed)
    }

    /// Calls the wrapped function with `args` and returns its result.
    ///
    /// If the function panics, the record is still appended and the panic continues to unwind.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe cannot take its before-snapshot, in which case the function
    /// is not called.
    pub fn call<Args>(&self, args: Args) -> Result<F::Output>
    where
        F: Invoke<Args>,
    {
        self.invocations.fetch_add(1, atomic::Ordering::Relaxed);

        let measurement = self.collector.start(&self.name, Scope::Function)?;
        self.collector.probe().enter_function();

        let output = self.function.invoke(args);
        drop(measurement);

        Ok(output)
    }
}

impl<P: Probe, F> fmt::Debug for MeasuredFn<P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasuredFn")
            .field("collector", &self.collector)
            .field("name", &self.name)
            .field("invocations", &self.invocations())
            .finish_non_exhaustive()
    }
}
