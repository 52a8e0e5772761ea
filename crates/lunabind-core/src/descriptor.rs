//! Per-type descriptor records.
//!
//! A [`TypeDescriptor`] is the single record the registry holds for one host
//! type: a display name (diagnostics only, never identity), the type's hash,
//! and the table of installed hook slots. The registry allocates each record
//! once behind an `Rc` and never replaces it; **reference identity of that
//! `Rc` is the type-confusion boundary**. Opaque blocks carry a clone of the
//! `Rc`, and validation compares it to the registry's stored instance with
//! [`TypeDescriptor::same_record`] - never by display name, which is not
//! guaranteed unique and must never be trusted as a security boundary.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{MetaSlot, RawAddr, TypeHash};

/// A hook installed in a descriptor slot.
///
/// Hooks are capability closures over the payload address, invoked by the
/// runtime's collector (for [`MetaSlot::Finalize`]) or by the surrounding
/// binding generator for the other slots - never directly by application
/// code.
pub type SlotHook = Box<dyn Fn(RawAddr)>;

/// Shared handle to a registry-owned descriptor record.
pub type DescriptorRef = Rc<TypeDescriptor>;

/// The per-type metadata record used to both identify and equip opaque
/// blocks.
///
/// Slots live behind a `RefCell` because records are frozen behind `Rc`
/// once registered, while slot installation remains open to the surrounding
/// binding generator. The layer is single-threaded (the runtime instance is
/// not thread-safe), so interior mutability here needs no locking.
pub struct TypeDescriptor {
    name: &'static str,
    hash: TypeHash,
    slots: RefCell<FxHashMap<MetaSlot, SlotHook>>,
}

impl TypeDescriptor {
    /// Create a new record with an empty slot table.
    pub fn new(name: &'static str, hash: TypeHash) -> Self {
        Self {
            name,
            hash,
            slots: RefCell::new(FxHashMap::default()),
        }
    }

    /// Human-readable type name, for diagnostics only.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// The identity token this record was registered under.
    pub fn type_hash(&self) -> TypeHash {
        self.hash
    }

    /// Install a hook into a named slot, replacing any previous hook there.
    pub fn install_slot(&self, slot: MetaSlot, hook: SlotHook) {
        self.slots.borrow_mut().insert(slot, hook);
    }

    /// Check whether a slot has an installed hook.
    pub fn has_slot(&self, slot: MetaSlot) -> bool {
        self.slots.borrow().contains_key(&slot)
    }

    /// Number of installed slots.
    pub fn slot_count(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Run `f` against the hook in `slot`, if one is installed.
    ///
    /// The hook is borrowed from the slot table for the duration of the
    /// call; a hook must not install slots on its own descriptor.
    pub fn with_slot<R>(&self, slot: MetaSlot, f: impl FnOnce(&SlotHook) -> R) -> Option<R> {
        let slots = self.slots.borrow();
        slots.get(&slot).map(f)
    }

    /// Compare two descriptor handles by record identity.
    ///
    /// This is the only legitimate equality for descriptors: two records
    /// with the same display name are still different types.
    pub fn same_record(a: &DescriptorRef, b: &DescriptorRef) -> bool {
        Rc::ptr_eq(a, b)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("hash", &self.hash)
            .field("slots", &format!("<{} installed>", self.slot_count()))
            .finish()
    }
}
