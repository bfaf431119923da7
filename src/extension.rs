//! The extension entity and its behavior seam.
//!
//! An [`Extension`] is one attached behavior instance: a thermostat, a
//! boundary constraint, an external force, an output coupling. This module
//! owns the parts common to every behavior — identity validation, the
//! group binding, capability flags, the phase mask, and the generic
//! parameter-modification protocol. The behavior-specific math lives
//! behind the [`Behavior`] trait and is invisible to this core.

use serde::{Deserialize, Serialize};

use crate::error::ExtensionError;
use crate::group::{GroupId, GroupRegistry};
use crate::phase::PhaseMask;

/// Cross-cutting properties of an extension, read by external subsystems.
///
/// This core only allocates and defaults these; a concrete behavior's
/// initialization sets the ones that apply to it, and the restart,
/// reporting, and neighbor-list subsystems act on them. Every flag
/// defaults to false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Contributes whole-simulation state to restart files.
    pub restart_global: bool,
    /// Contributes per-particle state to restart files.
    pub restart_peratom: bool,
    /// Can force a neighbor-list rebuild.
    pub force_reneighbor: bool,
    /// Changes the simulation box.
    pub box_change: bool,
    /// Part of a rigid-body subsystem.
    pub rigid: bool,
    /// Contributes to the virial/stress computation.
    pub virial: bool,
    /// Suppresses box-size constraints.
    pub no_change_box: bool,
    /// Exposes a reportable scalar output.
    pub scalar_output: bool,
    /// Exposes a reportable vector output.
    pub vector_output: bool,
    /// Exposes a reportable per-particle output.
    pub peratom_output: bool,
}

/// One attached behavior instance, bound to a named particle group.
///
/// Created from the leading tokens of an extension command
/// (`id group style ...`). Construction validates the ID, resolves the
/// group, and zeroes every flag; it either fully succeeds or fails with a
/// fatal error, and it never registers the instance anywhere — that is the
/// caller's job.
///
/// # Examples
///
/// ```
/// use granule::{Extension, GroupRegistry};
///
/// let groups = GroupRegistry::new();
/// let ext = Extension::new("relax1", "all", "nve_limit", &groups).unwrap();
/// assert_eq!(ext.id(), "relax1");
/// assert_eq!(ext.group_bit(), 1);
/// assert!(ext.phase_mask.is_empty());
/// assert!(!ext.thermo_energy());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    id: String,
    style: String,
    group: GroupId,
    group_bit: u32,

    /// Cross-cutting capability flags, all false until the behavior's own
    /// initialization sets them.
    pub capabilities: Capabilities,

    /// Timestep phases this extension must be invoked during. Empty until
    /// the behavior's own initialization ORs its phases in.
    pub phase_mask: PhaseMask,

    /// Scalars per particle to exchange in forward communication passes.
    pub comm_forward: usize,

    /// Scalars per particle to exchange in reverse communication passes.
    pub comm_reverse: usize,

    thermo_energy: bool,
}

impl Extension {
    /// Constructs an extension from its identity, group, and style.
    ///
    /// The ID must be non-empty and consist of ASCII alphanumeric
    /// characters or underscores. The group name must already exist in
    /// `groups`; its mask bit is cached here so per-particle membership
    /// tests never go back through the registry. The style is copied
    /// verbatim — interpreting it is the style factory's job.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::InvalidIdentifier`] for a malformed ID and
    /// [`ExtensionError::UnknownGroup`] for an unresolvable group name.
    /// Both are fatal to the enclosing command.
    pub fn new(
        id: impl Into<String>,
        group_name: &str,
        style: impl Into<String>,
        groups: &GroupRegistry,
    ) -> Result<Self, ExtensionError> {
        let id = id.into();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ExtensionError::InvalidIdentifier { id });
        }

        let group = groups
            .lookup(group_name)
            .ok_or_else(|| ExtensionError::UnknownGroup {
                name: group_name.to_string(),
            })?;
        let group_bit = groups.bitmask(group);

        Ok(Self {
            id,
            style: style.into(),
            group,
            group_bit,
            capabilities: Capabilities::default(),
            phase_mask: PhaseMask::empty(),
            comm_forward: 0,
            comm_reverse: 0,
            thermo_energy: false,
        })
    }

    /// The unique identifier this instance was created with.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The behavior-type tag, opaque to this core.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }

    /// The particle group this extension operates on.
    #[must_use]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// The group's capability-mask bit, cached at construction.
    #[must_use]
    pub const fn group_bit(&self) -> u32 {
        self.group_bit
    }

    /// Whether this extension's energy term enters thermodynamic reporting.
    ///
    /// Toggled only through the `energy yes|no` modify keyword.
    #[must_use]
    pub const fn thermo_energy(&self) -> bool {
        self.thermo_energy
    }
}

/// The open seam between the generic core and a concrete behavior.
///
/// Concrete behaviors own an [`Extension`] for the common state and
/// implement this trait for everything style-specific. The scheduler and
/// the modify dispatcher only ever see `dyn Behavior`, so new behaviors
/// plug in without any central type switch.
///
/// Phase hooks default to no-ops; a behavior overrides exactly the hooks
/// whose flags it ORs into its phase mask. The scheduler is expected to
/// consult the mask and skip extensions that did not opt in, but a hook
/// must stay harmless if called anyway.
///
/// # Examples
///
/// ```
/// use granule::{Behavior, Extension, GroupRegistry, PhaseMask};
///
/// struct Drag {
///     ext: Extension,
///     coefficient: f64,
/// }
///
/// impl Behavior for Drag {
///     fn extension(&self) -> &Extension {
///         &self.ext
///     }
///
///     fn extension_mut(&mut self) -> &mut Extension {
///         &mut self.ext
///     }
///
///     fn modify_param(&mut self, args: &[&str]) -> usize {
///         if args[0] == "coefficient" {
///             if let Some(c) = args.get(1).and_then(|v| v.parse().ok()) {
///                 self.coefficient = c;
///                 return 2;
///             }
///         }
///         0
///     }
/// }
///
/// let groups = GroupRegistry::new();
/// let mut ext = Extension::new("drag1", "all", "drag", &groups).unwrap();
/// ext.phase_mask = PhaseMask::POST_FORCE;
/// let mut drag = Drag { ext, coefficient: 1.0 };
///
/// drag.modify_params(&["coefficient", "2.5", "energy", "yes"]).unwrap();
/// assert_eq!(drag.coefficient, 2.5);
/// assert!(drag.extension().thermo_energy());
/// ```
pub trait Behavior {
    /// Shared extension state owned by this behavior.
    fn extension(&self) -> &Extension;

    /// Mutable access to the shared extension state.
    fn extension_mut(&mut self) -> &mut Extension;

    /// Behavior-specific modify vocabulary.
    ///
    /// Called by [`modify_params`](Behavior::modify_params) with the
    /// remaining tokens when the leading token is not a common keyword.
    /// Returns how many tokens were consumed, or 0 if the leading token is
    /// not recognized (which fails the whole command). The default
    /// recognizes nothing.
    fn modify_param(&mut self, args: &[&str]) -> usize {
        let _ = args;
        0
    }

    /// Processes a modification command.
    ///
    /// Tokens are consumed left to right in a single pass. The common
    /// vocabulary is handled here — `energy yes|no` toggles thermodynamic
    /// energy reporting — and anything else is delegated to
    /// [`modify_param`](Behavior::modify_param) starting at the current
    /// position. Later keywords win over earlier ones, and effects applied
    /// before a fatal token are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::IllegalModifyCommand`] for an empty
    /// command, a malformed or dangling `energy` keyword, or a token the
    /// behavior does not recognize.
    fn modify_params(&mut self, args: &[&str]) -> Result<(), ExtensionError> {
        if args.is_empty() {
            return Err(ExtensionError::IllegalModifyCommand {
                reason: "no arguments".to_string(),
            });
        }

        let mut iarg = 0;
        while iarg < args.len() {
            if args[iarg] == "energy" {
                match args.get(iarg + 1).copied() {
                    Some("yes") => self.extension_mut().thermo_energy = true,
                    Some("no") => self.extension_mut().thermo_energy = false,
                    Some(other) => {
                        return Err(ExtensionError::IllegalModifyCommand {
                            reason: format!("expected 'yes' or 'no' after 'energy', got '{other}'"),
                        });
                    }
                    None => {
                        return Err(ExtensionError::IllegalModifyCommand {
                            reason: "'energy' requires a yes/no value".to_string(),
                        });
                    }
                }
                iarg += 2;
            } else {
                let consumed = self.modify_param(&args[iarg..]);
                if consumed == 0 {
                    return Err(ExtensionError::IllegalModifyCommand {
                        reason: format!("unrecognized keyword '{}'", args[iarg]),
                    });
                }
                iarg += consumed;
            }
        }

        Ok(())
    }

    /// Invoked before positions are integrated.
    fn initial_integrate(&mut self) {}

    /// Invoked before particles migrate between processes.
    fn pre_exchange(&mut self) {}

    /// Invoked before the neighbor list is rebuilt.
    fn pre_neighbor(&mut self) {}

    /// Invoked after forces are computed.
    fn post_force(&mut self) {}

    /// Invoked after velocities are integrated.
    fn final_integrate(&mut self) {}

    /// Invoked at the end of the step.
    fn end_of_step(&mut self) {}

    /// Invoked before positions are integrated at an inner multi-rate level.
    fn initial_integrate_multi(&mut self, level: usize) {
        let _ = level;
    }

    /// Invoked after forces are computed at an inner multi-rate level.
    fn post_force_multi(&mut self, level: usize) {
        let _ = level;
    }

    /// Invoked after velocities are integrated at an inner multi-rate level.
    fn final_integrate_multi(&mut self, level: usize) {
        let _ = level;
    }

    /// Invoked after forces are computed during minimization.
    fn min_post_force(&mut self) {}

    /// Invoked during minimization energy evaluation.
    fn min_energy(&mut self) {}
}

impl core::fmt::Debug for dyn Behavior {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Behavior")
            .field("id", &self.extension().id())
            .finish_non_exhaustive()
    }
}
