//! Ownership strategies for opaque blocks.
//!
//! A strategy decides who destroys a host object and when. It is chosen
//! statically, once, at the moment a type is registered - not re-decided per
//! call - and supplies three capabilities behind one interface: the payload
//! shape written into a block, raw extraction out of a validated block, and
//! the finalize hook (if any) installed on the type's descriptor record.
//!
//! | Strategy | Payload | Finalize hook |
//! |---|---|---|
//! | [`Value<T>`] | `T` inline | drops `T` in place |
//! | [`RawPointer<T>`] | `*mut T` inline | none - the referent is owned elsewhere |
//! | [`SharedPointer<T>`] | `Option<Arc<T>>` inline | drops the handle in place |
//!
//! Extraction always happens *after* the identity chokepoint has accepted
//! the block, so the payload is known to have this strategy's shape; the
//! remaining checks are strategy-specific (only the shared strategy can
//! still refuse, for an empty handle).

use std::alloc::Layout;
use std::marker::PhantomData;
use std::sync::Arc;

use lunabind_core::{ExtractError, MetaSlot, RawAddr, TypeDescriptor, TypeHash};

use crate::host_type::HostType;

/// Domain-mixing constants distinguishing the three payload shapes.
///
/// A host type bound under two different strategies is two different opaque
/// types - their payload bytes have different shapes and different
/// destruction rules - so each strategy mixes its own domain into the
/// binding identity, the way a pointer and a shared handle to the same
/// wrapped type carry distinct type ids.
pub mod strategy_domain {
    /// Domain marker for value-owned bindings.
    pub const VALUE: u64 = 0x1f8a_6d03_b7e4_925c;

    /// Domain marker for non-owning raw-pointer bindings.
    pub const RAW_POINTER: u64 = 0xa450_93f1_2c8b_d67e;

    /// Domain marker for shared-ownership bindings.
    pub const SHARED: u64 = 0x6e21_f58c_490d_a3b7;
}

/// One ownership strategy for one host type.
///
/// Implementations are zero-sized adapter types; they are used purely as
/// type parameters and never constructed.
pub trait Ownership: 'static {
    /// The host type exposed to the runtime.
    type Target: HostType;

    /// What is actually stored in the block's payload bytes.
    type Payload: 'static;

    /// The identity token this binding registers under.
    ///
    /// Derived from the target's hash mixed with the strategy's domain, so
    /// the same host type bound under two strategies gets two independent
    /// descriptor records and can never be finalized with the wrong hook.
    fn binding_hash() -> TypeHash;

    /// Layout of the payload bytes to allocate per block.
    fn payload_layout() -> Layout {
        Layout::new::<Self::Payload>()
    }

    /// Write the payload into freshly allocated, uninitialized block memory.
    ///
    /// # Safety
    ///
    /// `addr` must be valid for writes of `Self::Payload` and properly
    /// aligned, and must not already hold an initialized payload.
    unsafe fn write_payload(addr: RawAddr, payload: Self::Payload) {
        unsafe { addr.write(payload) }
    }

    /// Extract the raw host-object address from a validated payload.
    ///
    /// # Safety
    ///
    /// `addr` must be the payload address of a live block whose descriptor
    /// passed the identity check for `Self::Target` under this strategy.
    unsafe fn extract_raw(addr: RawAddr) -> Result<*mut Self::Target, ExtractError>;

    /// Install this strategy's finalize hook on a freshly created
    /// descriptor record. Runs once, at registration.
    fn install_finalizer(descriptor: &TypeDescriptor);
}

/// The runtime owns the object's entire lifetime.
///
/// The host object's bytes live inline in the block; when the runtime
/// collects the block, the finalize hook runs the destructor in place. No
/// separate deallocation happens - the block's storage is reused or freed
/// by the heap itself.
pub struct Value<T: HostType>(PhantomData<T>);

impl<T: HostType> Ownership for Value<T> {
    type Target = T;
    type Payload = T;

    fn binding_hash() -> TypeHash {
        TypeHash(strategy_domain::VALUE ^ T::type_hash().as_u64())
    }

    unsafe fn extract_raw(addr: RawAddr) -> Result<*mut T, ExtractError> {
        Ok(addr.cast::<T>())
    }

    fn install_finalizer(descriptor: &TypeDescriptor) {
        descriptor.install_slot(
            MetaSlot::Finalize,
            Box::new(|addr| unsafe { addr.drop_in_place::<T>() }),
        );
    }
}

/// The object's lifetime is owned by host-side code, outside the runtime.
///
/// The block stores a single non-owning address. No finalize hook is
/// installed; collection releases only the block itself. The stored pointer
/// is handed back as-is - the pointee is never null-checked here, because
/// this layer does not own it and cannot judge its validity.
pub struct RawPointer<T: HostType>(PhantomData<T>);

impl<T: HostType> Ownership for RawPointer<T> {
    type Target = T;
    type Payload = *mut T;

    fn binding_hash() -> TypeHash {
        TypeHash(strategy_domain::RAW_POINTER ^ T::type_hash().as_u64())
    }

    unsafe fn extract_raw(addr: RawAddr) -> Result<*mut T, ExtractError> {
        Ok(unsafe { addr.read::<*mut T>() })
    }

    fn install_finalizer(_descriptor: &TypeDescriptor) {
        // Non-owning: nothing to run at collection.
    }
}

/// Host and runtime jointly extend the object's lifetime.
///
/// The block stores a shared handle inline. The finalize hook drops the
/// handle in place, decrementing the shared refcount atomically (host code
/// may be dropping its own clones concurrently) without assuming it reaches
/// zero. An empty handle - the released state - is refused at extraction,
/// never returned as a null success.
pub struct SharedPointer<T: HostType>(PhantomData<T>);

impl<T: HostType> Ownership for SharedPointer<T> {
    type Target = T;
    type Payload = Option<Arc<T>>;

    fn binding_hash() -> TypeHash {
        TypeHash(strategy_domain::SHARED ^ T::type_hash().as_u64())
    }

    unsafe fn extract_raw(addr: RawAddr) -> Result<*mut T, ExtractError> {
        match unsafe { addr.as_ref::<Option<Arc<T>>>() } {
            Some(handle) => Ok(Arc::as_ptr(handle) as *mut T),
            None => Err(ExtractError::EmptyHandle {
                type_name: T::type_name(),
            }),
        }
    }

    fn install_finalizer(descriptor: &TypeDescriptor) {
        descriptor.install_slot(
            MetaSlot::Finalize,
            Box::new(|addr| unsafe { addr.drop_in_place::<Option<Arc<T>>>() }),
        );
    }
}
