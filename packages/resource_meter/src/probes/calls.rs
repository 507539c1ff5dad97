use std::cell::Cell;
use std::marker::PhantomData;

use crate::{Metrics, Probe, Result};

thread_local! {
    static CALLS: Cell<u64> = const { Cell::new(0) };
}

/// Marks one function call for any [`CallProbe`] measurement active on this thread.
///
/// Place it at the top of functions whose calls should be counted inside measured regions.
///
/// # Examples
///
/// ```
/// use resource_meter::{CallCollector, CallProbe, count_call};
///
/// fn visit(depth: u32) {
///     count_call();
///     if depth > 0 {
///         visit(depth - 1);
///     }
/// }
///
/// let collector = CallCollector::new(CallProbe::new());
/// collector.measure("walk", || visit(4)).unwrap();
///
/// assert_eq!(collector.get_records()[0].metrics().get_f64("call_count"), Some(5.0));
/// ```
#[inline]
pub fn count_call() {
    CALLS.set(CALLS.get().wrapping_add(1));
}

/// The calling thread's call counter when a measurement began.
#[derive(Debug)]
pub struct CallMark {
    calls: u64,

    _single_threaded: PhantomData<*const ()>,
}

/// Counts calls marked with [`count_call()`] on the measuring thread.
///
/// A function wrapped by [`Collector::measure_function()`](crate::Collector::measure_function)
/// counts as one call per invocation in addition to the calls it marks itself.
#[derive(Clone, Debug, Default)]
pub struct CallProbe;

impl CallProbe {
    /// Creates a call probe.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Probe for CallProbe {
    const KIND: &'static str = "calls";
    const BLOCK_LABEL: &'static str = "Function call block";
    const STATEMENT_LABEL: &'static str = "Function call line(s)";

    type Start = CallMark;

    fn begin(&self) -> Result<CallMark> {
        Ok(CallMark {
            calls: CALLS.get(),
            _single_threaded: PhantomData,
        })
    }

    fn finish(&self, start: CallMark) -> Result<Metrics> {
        let calls = CALLS.get().wrapping_sub(start.calls);

        Ok(Metrics::new().with("call_count", calls))
    }

    fn describe(&self, label: &str, metrics: &Metrics) -> Vec<String> {
        metrics
            .get("call_count")
            .map(|calls| format!("{label} made {calls} function calls"))
            .into_iter()
            .collect()
    }

    fn enter_function(&self) {
        count_call();
    }
}
