//! Timestep-phase participation vocabulary.
//!
//! The scheduler walks a fixed set of named points in every timestep and,
//! at each point, invokes the extensions whose phase mask carries that
//! point's bit. The vocabulary is process-wide: every extension and the
//! scheduler read the same constant table. Changing it is a protocol
//! change for the whole engine, never a per-instance decision.
//!
//! This module defines the vocabulary only. Extensions OR the relevant
//! bits into their mask during their own initialization; nothing here
//! sets a bit.

bitflags::bitflags! {
    /// Bit-set of timestep phases an extension participates in.
    ///
    /// Each flag is a distinct, non-overlapping bit. An empty mask means
    /// the extension is never invoked by the scheduler (it may still be
    /// consulted through its capability flags, e.g. for restart data).
    ///
    /// # Examples
    ///
    /// ```
    /// use granule::PhaseMask;
    ///
    /// let mask = PhaseMask::POST_FORCE | PhaseMask::END_OF_STEP;
    /// assert!(mask.contains(PhaseMask::POST_FORCE));
    /// assert!(!mask.contains(PhaseMask::INITIAL_INTEGRATE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PhaseMask: u32 {
        /// Before positions are integrated at the start of the step.
        const INITIAL_INTEGRATE = 1;
        /// Before particles migrate between processes.
        const PRE_EXCHANGE = 2;
        /// Before the neighbor list is rebuilt.
        const PRE_NEIGHBOR = 4;
        /// After forces are computed.
        const POST_FORCE = 8;
        /// After velocities are integrated at the end of the step.
        const FINAL_INTEGRATE = 16;
        /// At the very end of the step.
        const END_OF_STEP = 32;
        /// During thermodynamic energy reporting.
        const THERMO_ENERGY = 64;
        /// `INITIAL_INTEGRATE` at an inner level of a multi-rate integrator.
        const INITIAL_INTEGRATE_MULTI = 128;
        /// `POST_FORCE` at an inner level of a multi-rate integrator.
        const POST_FORCE_MULTI = 256;
        /// `FINAL_INTEGRATE` at an inner level of a multi-rate integrator.
        const FINAL_INTEGRATE_MULTI = 512;
        /// After forces are computed during minimization.
        const MIN_POST_FORCE = 1024;
        /// During energy evaluation in minimization line searches.
        const MIN_ENERGY = 2048;
    }
}

impl Default for PhaseMask {
    fn default() -> Self {
        Self::empty()
    }
}
