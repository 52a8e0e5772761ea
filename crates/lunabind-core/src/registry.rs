//! The per-runtime type identity registry.
//!
//! One [`TypeRegistry`] lives inside each runtime instance (there is no
//! process-global registry), keyed by [`TypeHash`]. It is lazily populated
//! on first registration, read-mostly after warm-up, and never torn down
//! mid-process - records must outlive every block that references them,
//! because the stored `Rc` instance *is* the type's identity.
//!
//! Registration is idempotent and never overwrites: third-party code may
//! already hold the first record for reference-identity checks, so a second
//! registration of the same type leaves it untouched.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::descriptor::{DescriptorRef, TypeDescriptor};
use crate::type_hash::TypeHash;

/// Outcome of a registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// A new record was created and inserted.
    Created,
    /// A record for this type already existed and was left untouched.
    AlreadyPresent,
}

impl RegisterOutcome {
    /// Whether this registration created the record.
    pub fn created(self) -> bool {
        matches!(self, RegisterOutcome::Created)
    }
}

/// Process-unique association from type identity to descriptor record.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    records: FxHashMap<TypeHash, DescriptorRef>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for a type. No side effects.
    pub fn get(&self, hash: TypeHash) -> Option<&DescriptorRef> {
        self.records.get(&hash)
    }

    /// Register a type, creating its record on first use.
    ///
    /// If a record for `hash` already exists it is returned untouched and
    /// the outcome is [`RegisterOutcome::AlreadyPresent`]; `install` does
    /// not run. Otherwise a fresh record is created, stamped with `name`,
    /// handed to `install` for one-time slot installation, inserted, and
    /// the outcome is [`RegisterOutcome::Created`].
    pub fn register(
        &mut self,
        hash: TypeHash,
        name: &'static str,
        install: impl FnOnce(&TypeDescriptor),
    ) -> RegisterOutcome {
        if self.records.contains_key(&hash) {
            return RegisterOutcome::AlreadyPresent;
        }
        let record = TypeDescriptor::new(name, hash);
        install(&record);
        self.records.insert(hash, Rc::new(record));
        RegisterOutcome::Created
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no types are registered yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta_slot::MetaSlot;

    #[test]
    fn get_on_empty_registry_is_none() {
        let registry = TypeRegistry::new();
        assert!(registry.get(TypeHash::from_name("Point")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn register_creates_then_reports_present() {
        let mut registry = TypeRegistry::new();
        let hash = TypeHash::from_name("Point");

        assert!(registry.register(hash, "Point", |_| {}).created());
        assert_eq!(
            registry.register(hash, "Point", |_| {}),
            RegisterOutcome::AlreadyPresent
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reregistration_keeps_record_identity() {
        let mut registry = TypeRegistry::new();
        let hash = TypeHash::from_name("Point");

        registry.register(hash, "Point", |_| {});
        let first = Rc::clone(registry.get(hash).unwrap());

        registry.register(hash, "Point", |_| {});
        let second = registry.get(hash).unwrap();

        assert!(TypeDescriptor::same_record(&first, second));
    }

    #[test]
    fn install_runs_only_on_creation() {
        let mut registry = TypeRegistry::new();
        let hash = TypeHash::from_name("Point");
        let mut calls = 0;

        registry.register(hash, "Point", |desc| {
            calls += 1;
            desc.install_slot(MetaSlot::Finalize, Box::new(|_| {}));
        });
        registry.register(hash, "Point", |_| calls += 10);

        assert_eq!(calls, 1);
        assert!(registry.get(hash).unwrap().has_slot(MetaSlot::Finalize));
    }

    #[test]
    fn records_are_stamped_with_name_and_hash() {
        let mut registry = TypeRegistry::new();
        let hash = TypeHash::from_name("game::Player");

        registry.register(hash, "Player", |_| {});
        let record = registry.get(hash).unwrap();
        assert_eq!(record.type_name(), "Player");
        assert_eq!(record.type_hash(), hash);
    }
}
