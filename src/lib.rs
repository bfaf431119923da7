//! # Granule - Extension Core for Particle Simulations
//!
//! Granule is the pluggable-extension core of a particle-based simulation
//! engine. Independently implemented behaviors — thermostats, boundary
//! constraints, external forces, output couplings — attach to a running
//! simulation, validate themselves at construction, bind to a named
//! particle group, and are invoked by the scheduler at declared phases of
//! every timestep.
//!
//! ## Core Concepts
//!
//! - **Extension**: one attached behavior instance — validated identity,
//!   group binding, capability flags, phase mask
//! - **Behavior**: the trait a concrete behavior implements; phase hooks
//!   and a style-specific modify vocabulary
//! - **PhaseMask**: the process-wide vocabulary of timestep phases shared
//!   by every extension and the scheduler
//! - **GroupRegistry**: named particle subsets, one capability-mask bit
//!   each
//! - **ExtensionRegistry**: owns live extensions, enforces ID uniqueness,
//!   routes modify commands, dispatches phase hooks
//!
//! ## Usage
//!
//! ```rust,ignore
//! use granule::{ExtensionRegistry, GroupRegistry, PhaseMask};
//!
//! let mut groups = GroupRegistry::new();
//! groups.create("mobile")?;
//!
//! let mut extensions = ExtensionRegistry::new();
//! extensions.add_from_command(
//!     &["thermo1", "mobile", "rescale", "300.0"],
//!     &groups,
//!     |ext, style_args| build_behavior(ext, style_args),
//! )?;
//!
//! // One timestep, as the scheduler drives it:
//! extensions.run(PhaseMask::INITIAL_INTEGRATE);
//! extensions.run(PhaseMask::POST_FORCE);
//! extensions.run(PhaseMask::FINAL_INTEGRATE);
//! extensions.run(PhaseMask::END_OF_STEP);
//!
//! // Later, a user command tweaks a live extension in place:
//! extensions.modify("thermo1", &["energy", "yes"])?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extension;
pub mod group;
pub mod phase;
pub mod registry;

// Re-export primary types at crate root for convenience
pub use error::{ExtensionError, GranuleError, GranuleResult, GroupError, RegistryError};
pub use extension::{Behavior, Capabilities, Extension};
pub use group::{GroupId, GroupRegistry, MAX_GROUPS};
pub use phase::PhaseMask;
pub use registry::ExtensionRegistry;
