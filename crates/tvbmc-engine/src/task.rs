use tvbmc_sat::formula::Formula;

/// Producer of the per-timestep formulas for one model/property pair.
///
/// Implementations encode program state with the names defined in
/// [`tvbmc_sat::literal`] so that counterexamples can be decoded.
pub trait TaskBuilder {
    /// Constraint on the state at timestep 0.
    fn initial_state(&self) -> Formula;

    /// Transition relation from timestep `timestep` to `timestep + 1`.
    fn transition(&self, timestep: usize) -> Formula;

    /// Violation of the property at `timestep`.
    fn property_violation(&self, timestep: usize) -> Formula;
}

impl<T: TaskBuilder + ?Sized> TaskBuilder for &T {
    fn initial_state(&self) -> Formula {
        (**self).initial_state()
    }

    fn transition(&self, timestep: usize) -> Formula {
        (**self).transition(timestep)
    }

    fn property_violation(&self, timestep: usize) -> Formula {
        (**self).property_violation(timestep)
    }
}

impl<T: TaskBuilder + ?Sized> TaskBuilder for Box<T> {
    fn initial_state(&self) -> Formula {
        (**self).initial_state()
    }

    fn transition(&self, timestep: usize) -> Formula {
        (**self).transition(timestep)
    }

    fn property_violation(&self, timestep: usize) -> Formula {
        (**self).property_violation(timestep)
    }
}
