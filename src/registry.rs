//! Ownership and dispatch of attached extensions.
//!
//! The registry owns every live [`Behavior`] instance, enforces ID
//! uniqueness, routes modification commands by ID, and drives the
//! per-phase hooks in insertion order. It is the single place an
//! extension lives between its construction command and its removal;
//! dropping an entry releases the instance and its owned strings.

use crate::error::{GranuleResult, RegistryError};
use crate::extension::{Behavior, Extension};
use crate::group::GroupRegistry;
use crate::phase::PhaseMask;

/// Registry of live extensions, consulted by the scheduler every step.
///
/// Extensions are stored and dispatched in insertion order. Uniqueness of
/// extension IDs is enforced here, not by [`Extension`] itself: two
/// instances with the same ID can exist, but not inside one registry.
///
/// # Examples
///
/// ```
/// use granule::{Behavior, Extension, ExtensionRegistry, GroupRegistry, PhaseMask};
///
/// struct Recenter {
///     ext: Extension,
/// }
///
/// impl Behavior for Recenter {
///     fn extension(&self) -> &Extension {
///         &self.ext
///     }
///     fn extension_mut(&mut self) -> &mut Extension {
///         &mut self.ext
///     }
/// }
///
/// let groups = GroupRegistry::new();
/// let mut registry = ExtensionRegistry::new();
/// registry
///     .add_from_command(&["rc1", "all", "recenter"], &groups, |mut ext, _args| {
///         ext.phase_mask = PhaseMask::END_OF_STEP;
///         Ok(Box::new(Recenter { ext }))
///     })
///     .unwrap();
///
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.union_mask(), PhaseMask::END_OF_STEP);
/// registry.run(PhaseMask::END_OF_STEP);
/// ```
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: Vec<Box<dyn Behavior>>,
}

impl ExtensionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an already-built behavior.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateExtension`] if an entry with the
    /// same ID is already registered.
    pub fn add(&mut self, behavior: Box<dyn Behavior>) -> Result<(), RegistryError> {
        let id = behavior.extension().id();
        if self.position(id).is_some() {
            return Err(RegistryError::DuplicateExtension { id: id.to_string() });
        }
        self.entries.push(behavior);
        Ok(())
    }

    /// Processes an extension construction command.
    ///
    /// The command is `[id, group_name, style, ...style_args]`. This
    /// validates the leading tokens into an [`Extension`], then hands the
    /// extension and the remaining style-specific tokens to `factory`,
    /// which builds the concrete behavior (typically keyed on
    /// [`Extension::style`]). Nothing is registered unless every step
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IllegalCommand`] for fewer than three
    /// tokens, any [`Extension::new`] failure, a `factory` failure, or
    /// [`RegistryError::DuplicateExtension`] for a reused ID.
    pub fn add_from_command<F>(
        &mut self,
        tokens: &[&str],
        groups: &GroupRegistry,
        factory: F,
    ) -> GranuleResult<()>
    where
        F: FnOnce(Extension, &[&str]) -> GranuleResult<Box<dyn Behavior>>,
    {
        let [id, group_name, style, style_args @ ..] = tokens else {
            return Err(RegistryError::IllegalCommand.into());
        };

        let ext = Extension::new(*id, group_name, *style, groups)?;
        if self.position(ext.id()).is_some() {
            return Err(RegistryError::DuplicateExtension {
                id: ext.id().to_string(),
            }
            .into());
        }

        let behavior = factory(ext, style_args)?;
        self.entries.push(behavior);
        Ok(())
    }

    /// Removes an extension, returning the behavior to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ExtensionNotFound`] for an unknown ID.
    pub fn remove(&mut self, id: &str) -> Result<Box<dyn Behavior>, RegistryError> {
        let idx = self
            .position(id)
            .ok_or_else(|| RegistryError::ExtensionNotFound { id: id.to_string() })?;
        Ok(self.entries.remove(idx))
    }

    /// Routes a modification command to the extension with this ID.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ExtensionNotFound`] for an unknown ID and
    /// propagates any [`crate::ExtensionError::IllegalModifyCommand`] from
    /// the instance's own token processing.
    pub fn modify(&mut self, id: &str, args: &[&str]) -> GranuleResult<()> {
        let idx = self
            .position(id)
            .ok_or_else(|| RegistryError::ExtensionNotFound { id: id.to_string() })?;
        self.entries[idx].modify_params(args)?;
        Ok(())
    }

    /// Looks up an extension's behavior by ID.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&dyn Behavior> {
        self.position(id).map(|i| self.entries[i].as_ref())
    }

    /// Looks up an extension's behavior by ID, mutably.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut (dyn Behavior + 'static)> {
        let idx = self.position(id)?;
        Some(self.entries[idx].as_mut())
    }

    /// Iterates over registered behaviors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Behavior> {
        self.entries.iter().map(|e| e.as_ref())
    }

    /// Number of registered extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no extensions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// ORs together the phase masks of every registered extension.
    ///
    /// The scheduler uses this to skip phases no extension participates in.
    #[must_use]
    pub fn union_mask(&self) -> PhaseMask {
        self.entries
            .iter()
            .fold(PhaseMask::empty(), |acc, e| acc | e.extension().phase_mask)
    }

    /// Invokes `phase`'s hook on every extension that declared it.
    ///
    /// `phase` must be a single flag; extensions are visited in insertion
    /// order and skipped unless their mask contains the flag.
    /// [`PhaseMask::THERMO_ENERGY`] has no hook (it routes energy terms to
    /// the reporting subsystem) and the multi-rate flags are driven through
    /// [`run_multi`](Self::run_multi); for those this is a no-op.
    pub fn run(&mut self, phase: PhaseMask) {
        for entry in &mut self.entries {
            if !entry.extension().phase_mask.contains(phase) {
                continue;
            }
            dispatch(entry.as_mut(), phase);
        }
    }

    /// Invokes a multi-rate hook at the given inner level.
    ///
    /// `phase` must be one of the `*_MULTI` flags; anything else is a
    /// no-op.
    pub fn run_multi(&mut self, phase: PhaseMask, level: usize) {
        for entry in &mut self.entries {
            if !entry.extension().phase_mask.contains(phase) {
                continue;
            }
            dispatch_multi(entry.as_mut(), phase, level);
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.extension().id() == id)
    }
}

fn dispatch(entry: &mut dyn Behavior, phase: PhaseMask) {
    if phase == PhaseMask::INITIAL_INTEGRATE {
        entry.initial_integrate();
    } else if phase == PhaseMask::PRE_EXCHANGE {
        entry.pre_exchange();
    } else if phase == PhaseMask::PRE_NEIGHBOR {
        entry.pre_neighbor();
    } else if phase == PhaseMask::POST_FORCE {
        entry.post_force();
    } else if phase == PhaseMask::FINAL_INTEGRATE {
        entry.final_integrate();
    } else if phase == PhaseMask::END_OF_STEP {
        entry.end_of_step();
    } else if phase == PhaseMask::MIN_POST_FORCE {
        entry.min_post_force();
    } else if phase == PhaseMask::MIN_ENERGY {
        entry.min_energy();
    }
}

fn dispatch_multi(entry: &mut dyn Behavior, phase: PhaseMask, level: usize) {
    if phase == PhaseMask::INITIAL_INTEGRATE_MULTI {
        entry.initial_integrate_multi(level);
    } else if phase == PhaseMask::POST_FORCE_MULTI {
        entry.post_force_multi(level);
    } else if phase == PhaseMask::FINAL_INTEGRATE_MULTI {
        entry.final_integrate_multi(level);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::{ExtensionError, GranuleError};

    /// Records every hook invocation into a shared trace.
    struct Traced {
        ext: Extension,
        trace: Rc<RefCell<Vec<String>>>,
    }

    impl Traced {
        fn log(&self, hook: &str) {
            self.trace
                .borrow_mut()
                .push(format!("{}:{hook}", self.ext.id()));
        }
    }

    impl Behavior for Traced {
        fn extension(&self) -> &Extension {
            &self.ext
        }

        fn extension_mut(&mut self) -> &mut Extension {
            &mut self.ext
        }

        fn modify_param(&mut self, args: &[&str]) -> usize {
            if args[0] == "trace" {
                self.log("modify");
                return 1;
            }
            0
        }

        fn initial_integrate(&mut self) {
            self.log("initial_integrate");
        }

        fn post_force(&mut self) {
            self.log("post_force");
        }

        fn end_of_step(&mut self) {
            self.log("end_of_step");
        }

        fn post_force_multi(&mut self, level: usize) {
            self.trace
                .borrow_mut()
                .push(format!("{}:post_force_multi@{level}", self.ext.id()));
        }
    }

    fn traced(
        id: &str,
        mask: PhaseMask,
        trace: &Rc<RefCell<Vec<String>>>,
        groups: &GroupRegistry,
    ) -> Box<dyn Behavior> {
        let mut ext = Extension::new(id, "all", "traced", groups).unwrap();
        ext.phase_mask = mask;
        Box::new(Traced {
            ext,
            trace: Rc::clone(trace),
        })
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry
            .add(traced("t1", PhaseMask::empty(), &trace, &groups))
            .unwrap();
        let err = registry
            .add(traced("t1", PhaseMask::empty(), &trace, &groups))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateExtension {
                id: "t1".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_from_command_requires_three_tokens() {
        let groups = GroupRegistry::new();
        let mut registry = ExtensionRegistry::new();
        let err = registry
            .add_from_command(&["only_id", "all"], &groups, |_, _| unreachable!())
            .unwrap_err();
        assert_eq!(err, GranuleError::Registry(RegistryError::IllegalCommand));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_from_command_propagates_construction_errors() {
        let groups = GroupRegistry::new();
        let mut registry = ExtensionRegistry::new();

        let err = registry
            .add_from_command(&["bad-id", "all", "style"], &groups, |_, _| unreachable!())
            .unwrap_err();
        assert!(err.is_extension());

        let err = registry
            .add_from_command(&["ok_id", "ghost", "style"], &groups, |_, _| unreachable!())
            .unwrap_err();
        assert_eq!(
            err,
            GranuleError::Extension(ExtensionError::UnknownGroup {
                name: "ghost".to_string()
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_from_command_passes_style_args() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();

        registry
            .add_from_command(
                &["t1", "all", "traced", "alpha", "beta"],
                &groups,
                |ext, style_args| {
                    assert_eq!(ext.style(), "traced");
                    assert_eq!(style_args, ["alpha", "beta"]);
                    Ok(Box::new(Traced {
                        ext,
                        trace: Rc::clone(&trace),
                    }))
                },
            )
            .unwrap();
        assert!(registry.find("t1").is_some());
    }

    #[test]
    fn test_remove_releases_entry() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry
            .add(traced("t1", PhaseMask::empty(), &trace, &groups))
            .unwrap();
        registry
            .add(traced("t2", PhaseMask::empty(), &trace, &groups))
            .unwrap();

        let removed = registry.remove("t1").unwrap();
        assert_eq!(removed.extension().id(), "t1");
        drop(removed);

        // Removing one entry leaves the other untouched.
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("t2").unwrap().extension().id(), "t2");
        assert_eq!(
            registry.remove("t1").unwrap_err(),
            RegistryError::ExtensionNotFound {
                id: "t1".to_string()
            }
        );
    }

    #[test]
    fn test_modify_routes_by_id() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry
            .add(traced("t1", PhaseMask::empty(), &trace, &groups))
            .unwrap();

        registry.modify("t1", &["energy", "yes", "trace"]).unwrap();
        assert!(registry.find("t1").unwrap().extension().thermo_energy());
        assert_eq!(*trace.borrow(), ["t1:modify"]);

        let err = registry.modify("ghost", &["energy", "yes"]).unwrap_err();
        assert!(err.is_registry());

        let err = registry.modify("t1", &["bogus"]).unwrap_err();
        assert!(err.is_extension());
    }

    #[test]
    fn test_union_mask() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        assert!(registry.union_mask().is_empty());

        registry
            .add(traced("t1", PhaseMask::INITIAL_INTEGRATE, &trace, &groups))
            .unwrap();
        registry
            .add(traced(
                "t2",
                PhaseMask::POST_FORCE | PhaseMask::END_OF_STEP,
                &trace,
                &groups,
            ))
            .unwrap();

        assert_eq!(
            registry.union_mask(),
            PhaseMask::INITIAL_INTEGRATE | PhaseMask::POST_FORCE | PhaseMask::END_OF_STEP
        );
    }

    #[test]
    fn test_run_respects_masks_and_insertion_order() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry
            .add(traced("t1", PhaseMask::POST_FORCE, &trace, &groups))
            .unwrap();
        registry
            .add(traced("t2", PhaseMask::END_OF_STEP, &trace, &groups))
            .unwrap();
        registry
            .add(traced("t3", PhaseMask::POST_FORCE, &trace, &groups))
            .unwrap();

        registry.run(PhaseMask::POST_FORCE);
        registry.run(PhaseMask::END_OF_STEP);
        // No extension declared this phase.
        registry.run(PhaseMask::PRE_NEIGHBOR);

        assert_eq!(
            *trace.borrow(),
            ["t1:post_force", "t3:post_force", "t2:end_of_step"]
        );
    }

    #[test]
    fn test_run_multi_passes_level() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry
            .add(traced("t1", PhaseMask::POST_FORCE_MULTI, &trace, &groups))
            .unwrap();

        registry.run_multi(PhaseMask::POST_FORCE_MULTI, 2);
        assert_eq!(*trace.borrow(), ["t1:post_force_multi@2"]);
    }

    #[test]
    fn test_run_with_thermo_energy_flag_is_noop() {
        let groups = GroupRegistry::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ExtensionRegistry::new();
        registry
            .add(traced("t1", PhaseMask::THERMO_ENERGY, &trace, &groups))
            .unwrap();

        registry.run(PhaseMask::THERMO_ENERGY);
        assert!(trace.borrow().is_empty());
    }
}
