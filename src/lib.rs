//! lunabind - a foreign-object binding layer for embedded scripting
//! runtimes.
//!
//! lunabind is the identity and ownership substrate beneath a script
//! binding generator: it tags every host object crossing into the runtime
//! with an unforgeable type identity, serves three ownership strategies
//! through one interface, and guarantees objects are destructed or released
//! at the right time and never misinterpreted as another host type.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Host                            │
//! │  ┌─────────────────────┐   ┌──────────────────────────┐  │
//! │  │    TypeRegistry     │   │       UserdataHeap       │  │
//! │  │ TypeHash → Rc<desc> │   │ generational blocks with │  │
//! │  │ (identity = Rc ptr) │   │ attached descriptors and │  │
//! │  └─────────────────────┘   │ finalize-hook collection │  │
//! │             ▲              └──────────────────────────┘  │
//! │             │ as_typed::<S>() - the one chokepoint       │
//! │  ┌──────────┴─────────────────────────────────────────┐  │
//! │  │  Ownership strategies: Value / RawPointer /        │  │
//! │  │  SharedPointer (chosen statically per type)        │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use lunabind::prelude::*;
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
//! let mut host = Host::new();
//! host.register::<Value<Point>>();
//!
//! let handle = host.push::<Value<Point>>(Point { x: 3, y: 4 }).unwrap();
//! let point = host.as_typed::<Value<Point>>(handle).unwrap();
//! assert_eq!(unsafe { (*point).x }, 3);
//!
//! // Collection runs Point's destructor in place, exactly once.
//! host.collect(handle);
//! assert!(host.as_typed::<Value<Point>>(handle).is_err());
//! ```
//!
//! The scripting runtime's own table and stack machinery, method dispatch,
//! and argument marshaling are external collaborators; this crate only
//! models the registry store and opaque-block heap it needs from them.

pub mod host;
pub mod host_type;
pub mod ownership;

pub use host::Host;
pub use host_type::HostType;
pub use ownership::{Ownership, RawPointer, SharedPointer, Value};

// Re-export the substrate so embedders need only one dependency.
pub use lunabind_core::{
    BindError, BlockHandle, CallerError, DescriptorRef, ExtractError, FinalizeFault, MetaSlot,
    RawAddr, RegisterOutcome, SlotHook, TypeDescriptor, TypeHash, TypeRegistry, UserdataBlock,
    UserdataHeap, Void,
};

pub mod prelude {
    pub use crate::host::Host;
    pub use crate::host_type::HostType;
    pub use crate::ownership::{Ownership, RawPointer, SharedPointer, Value};
    pub use lunabind_core::{
        BindError, BlockHandle, CallerError, ExtractError, MetaSlot, RegisterOutcome, TypeHash,
    };
}
