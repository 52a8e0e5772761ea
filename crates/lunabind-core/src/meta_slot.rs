//! The closed set of hook slots the scripting runtime recognizes.
//!
//! Each variant of [`MetaSlot`] names one slot a descriptor record can carry,
//! and maps to the runtime's canonical `__`-prefixed slot name. The set is
//! closed by construction: `canonical_name()` is total, so there is no
//! "unrecognized slot" failure path to handle at runtime. The only partial
//! direction is parsing a name back into a slot, which is an ordinary lookup
//! returning `Option`.

use std::fmt;

/// A recognized hook slot on a descriptor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaSlot {
    /// Finalizer, run by the runtime's collector when a block dies.
    Finalize,
    /// Length query.
    Length,
    /// Indexed (array-style) iteration.
    IndexedPairs,
    /// Generic (key/value) iteration.
    Pairs,
    /// String conversion for diagnostics and printing.
    Stringify,
    /// Invocation of the object as a function.
    Call,
    /// Index assignment (`obj[key] = value`).
    NewIndex,
    /// Addition operator.
    Add,
    /// Concatenation operator.
    Concat,
}

impl MetaSlot {
    /// All recognized slots, in canonical declaration order.
    pub const ALL: [MetaSlot; 9] = [
        MetaSlot::Finalize,
        MetaSlot::Length,
        MetaSlot::IndexedPairs,
        MetaSlot::Pairs,
        MetaSlot::Stringify,
        MetaSlot::Call,
        MetaSlot::NewIndex,
        MetaSlot::Add,
        MetaSlot::Concat,
    ];

    /// The runtime's canonical name for this slot.
    pub const fn canonical_name(self) -> &'static str {
        match self {
            MetaSlot::Finalize => "__gc",
            MetaSlot::Length => "__len",
            MetaSlot::IndexedPairs => "__ipairs",
            MetaSlot::Pairs => "__pairs",
            MetaSlot::Stringify => "__tostring",
            MetaSlot::Call => "__call",
            MetaSlot::NewIndex => "__newindex",
            MetaSlot::Add => "__add",
            MetaSlot::Concat => "__concat",
        }
    }

    /// Look up a slot by its canonical name.
    pub fn from_name(name: &str) -> Option<MetaSlot> {
        MetaSlot::ALL
            .into_iter()
            .find(|slot| slot.canonical_name() == name)
    }
}

impl fmt::Display for MetaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}
