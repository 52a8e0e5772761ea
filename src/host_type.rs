//! Trait for host types that can cross into the scripting runtime.
//!
//! # Example
//!
//! ```
//! use lunabind::{HostType, TypeHash};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl HostType for Point {
//!     fn type_name() -> &'static str {
//!         "Point"
//!     }
//! }
//!
//! // Identity defaults to the Rust type's TypeId hash.
//! assert_eq!(Point::type_hash(), TypeHash::of::<Point>());
//! ```

use lunabind_core::TypeHash;

/// A host type that can be registered with the binding layer.
///
/// `type_name()` is for diagnostics and display only - it is never used as
/// identity, because names are not guaranteed unique. Identity comes from
/// `type_hash()`, which defaults to the hash of the Rust `TypeId` and is
/// process-unique per type. Override it only for identities that must be
/// stable across processes.
pub trait HostType: 'static {
    /// Human-readable type name, stamped onto the descriptor record.
    fn type_name() -> &'static str;

    /// The identity token this type registers under.
    fn type_hash() -> TypeHash
    where
        Self: Sized,
    {
        TypeHash::of::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    impl HostType for Widget {
        fn type_name() -> &'static str {
            "Widget"
        }
    }

    struct NamedIdentity;

    impl HostType for NamedIdentity {
        fn type_name() -> &'static str {
            "NamedIdentity"
        }

        fn type_hash() -> TypeHash {
            TypeHash::from_name("NamedIdentity")
        }
    }

    #[test]
    fn default_identity_is_type_id_hash() {
        assert_eq!(Widget::type_hash(), TypeHash::of::<Widget>());
        assert_eq!(Widget::type_name(), "Widget");
    }

    #[test]
    fn identity_can_be_name_stable() {
        assert_eq!(
            NamedIdentity::type_hash(),
            TypeHash::from_name("NamedIdentity")
        );
        assert_ne!(NamedIdentity::type_hash(), TypeHash::of::<NamedIdentity>());
    }
}
