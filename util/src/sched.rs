//! # Time-triggered task scheduler
//!
//! This module provides the cooperative scheduler used by the control
//! executables. A fixed table of tasks is assembled at startup, and the whole
//! table is advanced synchronously by calling [`Scheduler::on_tick`] once per
//! base period from the executable's timing loop. Each task carries its own
//! period (a multiple of the base period) and fires when enough base periods
//! have elapsed.
//!
//! Tasks wrap a state machine implementing the [`Tickable`] trait, which
//! keeps the scheduler agnostic of the machine's logic: the task owns the
//! machine's state value and passes it by value through the tick function,
//! storing whatever state comes back.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{debug, trace};
use std::time::Duration;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A state machine which can be advanced one tick at a time by the scheduler.
///
/// Implementors perform one transition (and any action associated with the
/// newly entered state) per call, returning the new state. The tick function
/// must not block: the whole task table runs to completion within one base
/// period.
pub trait Tickable {
    /// The state type advanced by the scheduler.
    type State: Copy;

    /// Advance the machine by one tick, returning the new state.
    fn tick(&mut self, state: Self::State) -> Self::State;
}

/// Object-safe view of a task used by the scheduler table.
///
/// Implemented by [`Task`] for any machine type, so that tasks over
/// different machines can share one table.
trait TableEntry {
    /// True if the task's elapsed time has reached its period.
    fn is_due(&self) -> bool;

    /// Run the task's tick function and reset its elapsed time to zero.
    fn fire(&mut self);

    /// Add one base period to the task's elapsed time.
    fn accumulate(&mut self, base_period: Duration);

    /// The task's elapsed time since it last fired.
    #[cfg(test)]
    fn elapsed(&self) -> Duration;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single scheduled task: a state machine plus its timing bookkeeping.
///
/// The elapsed time is pre-set equal to the period on construction, so every
/// task fires on the very first scheduler invocation. Tasks are constructed
/// once at startup and live for the process lifetime.
pub struct Task<M: Tickable> {
    /// Current state of the machine, owned here and passed by value through
    /// the tick function.
    state: M::State,

    /// Rate at which the task should tick. Must be a positive multiple of
    /// the scheduler's base period. This is a caller contract, a period
    /// which is not a multiple drifts silently rather than erroring.
    period: Duration,

    /// Time accumulated since the task's previous tick.
    elapsed: Duration,

    /// The state machine itself.
    machine: M,
}

/// The cooperative scheduler.
///
/// Holds the fixed task table. The table must be fully assembled with
/// [`Scheduler::install`] before the first call to [`Scheduler::on_tick`];
/// there is no dynamic addition or removal afterwards. There are no
/// priorities beyond table order: ties are broken by installation order.
pub struct Scheduler {
    /// The interval at which `on_tick` is invoked. This is the greatest
    /// common divisor of all task periods and the scheduler's only clock
    /// granularity.
    base_period: Duration,

    /// The task table, in installation (and therefore execution) order.
    table: Vec<Box<dyn TableEntry>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<M: Tickable> Task<M> {
    /// Create a new task over the given machine.
    ///
    /// The elapsed time starts equal to `period` so the task fires on the
    /// first `on_tick` after installation.
    pub fn new(machine: M, initial_state: M::State, period: Duration) -> Self {
        Task {
            state: initial_state,
            period,
            elapsed: period,
            machine,
        }
    }

    /// The task's configured period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The machine state as of the last firing.
    pub fn state(&self) -> M::State {
        self.state
    }
}

impl<M: Tickable> TableEntry for Task<M> {
    fn is_due(&self) -> bool {
        self.elapsed >= self.period
    }

    fn fire(&mut self) {
        self.state = self.machine.tick(self.state);
        self.elapsed = Duration::ZERO;
    }

    fn accumulate(&mut self, base_period: Duration) {
        self.elapsed += base_period;
    }

    #[cfg(test)]
    fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Scheduler {
    /// Create a scheduler with an empty task table.
    pub fn new(base_period: Duration) -> Self {
        Scheduler {
            base_period,
            table: Vec::new(),
        }
    }

    /// Install a task at the end of the table.
    ///
    /// Installation order is execution order. The table must be complete
    /// before ticking starts.
    pub fn install<M>(&mut self, task: Task<M>)
    where
        M: Tickable + 'static,
    {
        debug!(
            "Task {} installed with period {:?}",
            self.table.len(),
            task.period
        );
        self.table.push(Box::new(task));
    }

    /// Advance the task table by one base period.
    ///
    /// For every task in table order: if the task's elapsed time has reached
    /// its period, its tick function is run and the elapsed time reset to
    /// zero; afterwards, unconditionally, one base period is added to the
    /// elapsed time. A task whose period equals the base period therefore
    /// fires on every invocation, and a task whose elapsed time has
    /// overshot its period still fires promptly rather than skipping.
    ///
    /// Infallible: scheduling is pure duration arithmetic and tick
    /// functions have no error path.
    pub fn on_tick(&mut self) {
        for (i, task) in self.table.iter_mut().enumerate() {
            if task.is_due() {
                task.fire();
                trace!("Task {} fired", i);
            }
            task.accumulate(self.base_period);
        }
    }

    /// Number of tasks in the table.
    pub fn num_tasks(&self) -> usize {
        self.table.len()
    }

    /// The scheduler's base period.
    pub fn base_period(&self) -> Duration {
        self.base_period
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Test machine which records each firing in a shared log.
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Tickable for Recorder {
        type State = u32;

        fn tick(&mut self, state: u32) -> u32 {
            self.log.borrow_mut().push(self.name);
            state + 1
        }
    }

    fn recorder(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Recorder {
        Recorder {
            name,
            log: Rc::clone(log),
        }
    }

    #[test]
    fn test_first_tick_fires_every_task() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base = Duration::from_millis(10);

        let mut sched = Scheduler::new(base);
        sched.install(Task::new(recorder("a", &log), 0, base));
        sched.install(Task::new(recorder("b", &log), 0, base * 3));

        sched.on_tick();

        // Both tasks fire immediately since elapsed starts equal to period
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_fires_every_kth_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base = Duration::from_millis(10);

        let mut sched = Scheduler::new(base);
        sched.install(Task::new(recorder("slow", &log), 0, base * 3));

        for _ in 0..12 {
            sched.on_tick();
        }

        // Fires on the 1st tick, then on every 3rd after: ticks 1, 4, 7, 10
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn test_base_period_task_fires_every_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base = Duration::from_millis(10);

        let mut sched = Scheduler::new(base);
        sched.install(Task::new(recorder("fast", &log), 0, base));

        for _ in 0..50 {
            sched.on_tick();
        }

        assert_eq!(log.borrow().len(), 50);
    }

    #[test]
    fn test_table_order_breaks_ties() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base = Duration::from_millis(10);

        let mut sched = Scheduler::new(base);
        sched.install(Task::new(recorder("x", &log), 0, base));
        sched.install(Task::new(recorder("y", &log), 0, base));

        for _ in 0..3 {
            sched.on_tick();
        }

        // Both due on every tick, always executed in installation order
        assert_eq!(*log.borrow(), vec!["x", "y", "x", "y", "x", "y"]);
    }

    #[test]
    fn test_elapsed_below_period_after_firing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base = Duration::from_millis(10);
        let period = base * 5;

        let mut sched = Scheduler::new(base);
        sched.install(Task::new(recorder("t", &log), 0, period));

        for _ in 0..25 {
            sched.on_tick();

            // After any on_tick call the elapsed time of a multi-period
            // task is in (0, period]: exactly base right after a firing,
            // never past the period beyond the pending accumulate.
            let elapsed = sched.table[0].elapsed();
            assert!(elapsed >= base);
            assert!(elapsed <= period);
        }
    }

    #[test]
    fn test_overshoot_fires_promptly() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base = Duration::from_millis(10);

        // A task whose elapsed time is past its period (as if a previous
        // firing was delayed) fires on the next tick rather than waiting
        // for an exact match.
        let mut task = Task::new(recorder("late", &log), 0, base * 2);
        task.elapsed = base * 3;

        let mut sched = Scheduler::new(base);
        sched.install(task);

        sched.on_tick();
        assert_eq!(log.borrow().len(), 1);

        // The firing reset the elapsed time, only this tick's base period
        // remains accumulated
        assert_eq!(sched.table[0].elapsed(), base);
    }

    #[test]
    fn test_state_passes_through_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let base = Duration::from_millis(10);

        // Recorder's tick returns state + 1, so the stored state follows
        // each firing's return value
        let mut task = Task::new(recorder("c", &log), 7, base);

        task.fire();
        assert_eq!(task.state(), 8);

        task.fire();
        assert_eq!(task.state(), 9);
    }
}
