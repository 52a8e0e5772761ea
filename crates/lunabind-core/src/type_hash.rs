//! Hash-based type identity tokens.
//!
//! This module provides [`TypeHash`], the 64-bit token that keys every
//! descriptor record in the type registry. Two hashes compare equal iff they
//! denote the same host type; a collision between distinct host types is a
//! correctness precondition of the whole layer, not a handled condition.
//!
//! Two constructors cover the two ways a type acquires identity:
//!
//! - [`TypeHash::of`] hashes the Rust `TypeId`, so every monomorphic host
//!   type gets a process-unique token with no registration ceremony.
//! - [`TypeHash::from_name`] hashes a qualified name with XXHash64, for
//!   identities that must be stable across processes (e.g. script-visible
//!   type names).
//!
//! # Examples
//!
//! ```
//! use lunabind_core::TypeHash;
//!
//! let a = TypeHash::from_name("Point");
//! let b = TypeHash::from_name("Point");
//! assert_eq!(a, b);
//!
//! struct Point;
//! struct Rect;
//! assert_ne!(TypeHash::of::<Point>(), TypeHash::of::<Rect>());
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-mixing constants for hash computation.
///
/// Name-derived hashes are XORed with a domain marker so they cannot collide
/// with hashes from other derivation schemes that share the same input bytes.
pub mod hash_constants {
    /// Domain marker for name-derived type hashes.
    pub const TYPE: u64 = 0x7b39_c1de_8f52_a604;
}

/// A 64-bit token identifying one host type.
///
/// The same input always produces the same hash, so tokens can be computed
/// before registration and compared without consulting the registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a type hash from a qualified type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Create a type hash from a Rust type's `TypeId`.
    ///
    /// This is the default identity for host types: unique per type within
    /// the process, independent of any display name. Note that it differs
    /// from `from_name()` for the same type, since it is derived from the
    /// compiler's internal type representation.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self::of_type_id(std::any::TypeId::of::<T>())
    }

    /// Create a type hash from an existing `TypeId`.
    #[inline]
    pub fn of_type_id(type_id: std::any::TypeId) -> Self {
        use std::hash::{Hash, Hasher};

        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        type_id.hash(&mut hasher);
        TypeHash(hasher.finish())
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_hash_determinism() {
        assert_eq!(TypeHash::from_name("Point"), TypeHash::from_name("Point"));
        assert_eq!(
            TypeHash::from_name("game::Player"),
            TypeHash::from_name("game::Player")
        );
    }

    #[test]
    fn name_hash_uniqueness() {
        let point = TypeHash::from_name("Point");
        let rect = TypeHash::from_name("Rect");
        let player = TypeHash::from_name("Player");

        assert_ne!(point, rect);
        assert_ne!(point, player);
        assert_ne!(rect, player);
    }

    #[test]
    fn type_id_hash_distinguishes_types() {
        struct A;
        struct B;

        assert_eq!(TypeHash::of::<A>(), TypeHash::of::<A>());
        assert_ne!(TypeHash::of::<A>(), TypeHash::of::<B>());
    }

    #[test]
    fn type_id_hash_matches_of_type_id() {
        struct A;

        assert_eq!(
            TypeHash::of::<A>(),
            TypeHash::of_type_id(std::any::TypeId::of::<A>())
        );
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::from_name("Point").is_empty());
    }

    #[test]
    fn hash_display() {
        let hash = TypeHash::from_name("Point");
        assert!(format!("{}", hash).starts_with("0x"));
    }

    #[test]
    fn hash_debug() {
        let hash = TypeHash::from_name("Point");
        assert!(format!("{:?}", hash).starts_with("TypeHash(0x"));
    }

    #[test]
    fn hash_as_u64() {
        let hash = TypeHash(0x1234_5678_9abc_def0);
        assert_eq!(hash.as_u64(), 0x1234_5678_9abc_def0);
    }
}
