//! Core substrate for the lunabind foreign-object binding layer.
//!
//! This crate holds the identity and storage machinery beneath the binding
//! API: hash-based type identity tokens, per-type descriptor records with
//! hook slots, the per-runtime type registry, raw payload addressing, and
//! the generational userdata heap that runs finalize hooks at collection
//! time. The ownership strategies and the validation chokepoint that sit on
//! top live in the `lunabind` crate.
//!
//! Everything here assumes the single-threaded cooperative model of an
//! embedded scripting runtime: one registry and one heap per runtime
//! instance, no locking, no blocking operations.

pub mod descriptor;
pub mod error;
pub mod heap;
pub mod memory;
pub mod meta_slot;
pub mod registry;
pub mod type_hash;

pub use descriptor::{DescriptorRef, SlotHook, TypeDescriptor};
pub use error::{BindError, CallerError, ExtractError, FinalizeFault};
pub use heap::{BlockHandle, UserdataBlock, UserdataHeap};
pub use memory::{RawAddr, Void};
pub use meta_slot::MetaSlot;
pub use registry::{RegisterOutcome, TypeRegistry};
pub use type_hash::TypeHash;
