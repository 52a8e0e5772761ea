//! The per-runtime facade: one registry, one heap, one validation chokepoint.
//!
//! A [`Host`] bundles the two runtime-side stores the binding layer needs -
//! the type identity registry and the userdata heap - for a single scripting
//! runtime instance. All registration, block creation, validation and
//! collection flow through it, on the one thread that owns the runtime.
//!
//! The interesting operation is [`Host::as_typed`]: the single chokepoint
//! that prevents type confusion between host types that happen to share a
//! memory layout. Its order of checks is deliberate:
//!
//! 1. stale handle or no attached descriptor → not an opaque object of this
//!    layer (script-side, recoverable);
//! 2. no registry record for the expected type → the *caller* never
//!    registered it (binding-author error, a different failure class);
//! 3. attached record not reference-identical to the registry's record →
//!    type mismatch (script-side, recoverable);
//! 4. otherwise the strategy extracts the raw host-object address.

use std::alloc::Layout;

use lunabind_core::{
    BindError, BlockHandle, CallerError, DescriptorRef, ExtractError, FinalizeFault,
    RegisterOutcome, TypeDescriptor, TypeRegistry, UserdataHeap,
};

use crate::host_type::HostType;
use crate::ownership::Ownership;

/// Binding-layer state for one scripting runtime instance.
#[derive(Debug, Default)]
pub struct Host {
    registry: TypeRegistry,
    heap: UserdataHeap,
}

impl Host {
    /// Create a fresh host with an empty registry and heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host type under ownership strategy `S`.
    ///
    /// The binding is keyed by [`Ownership::binding_hash`], so one host
    /// type may be bound under several strategies, each with its own
    /// record and finalize hook.
    ///
    /// Idempotent: the first call creates the descriptor record, stamps its
    /// display name, and installs the strategy's finalize hook; later calls
    /// return [`RegisterOutcome::AlreadyPresent`] and leave the existing
    /// record untouched, so reference-identity checks held by third parties
    /// stay valid.
    pub fn register<S: Ownership>(&mut self) -> RegisterOutcome {
        self.registry.register(
            S::binding_hash(),
            S::Target::type_name(),
            S::install_finalizer,
        )
    }

    /// The registry record for binding `S`, if it has been registered.
    pub fn descriptor_of<S: Ownership>(&self) -> Option<&DescriptorRef> {
        self.registry.get(S::binding_hash())
    }

    /// Create an opaque block holding `payload` under strategy `S`.
    ///
    /// Fails with [`CallerError::TypeNotRegistered`] if the binding has no
    /// registry record: a block without its binding's descriptor could
    /// never be validated back out.
    pub fn push<S: Ownership>(&mut self, payload: S::Payload) -> Result<BlockHandle, BindError> {
        let descriptor = self
            .registry
            .get(S::binding_hash())
            .cloned()
            .ok_or(CallerError::TypeNotRegistered(S::Target::type_name()))?;

        let handle = self.heap.allocate(S::payload_layout(), Some(descriptor));
        let addr = self
            .heap
            .payload_addr(handle)
            .expect("freshly allocated block is live");
        unsafe { S::write_payload(addr, payload) };
        Ok(handle)
    }

    /// Create a block with no descriptor attached, simulating userdata that
    /// belongs to some other subsystem. Validation always refuses it.
    pub fn push_foreign(&mut self, layout: Layout) -> BlockHandle {
        self.heap.allocate(layout, None)
    }

    /// Validate a block against `S::Target` and extract the raw host-object
    /// address. See the module docs for the check order.
    pub fn as_typed<S: Ownership>(&self, handle: BlockHandle) -> Result<*mut S::Target, BindError> {
        let block = self
            .heap
            .get(handle)
            .ok_or(ExtractError::StaleObject { index: handle.index })?;
        let attached = block.descriptor().ok_or(ExtractError::MissingMetatable)?;

        let expected = self
            .registry
            .get(S::binding_hash())
            .ok_or(CallerError::TypeNotRegistered(S::Target::type_name()))?;

        if !TypeDescriptor::same_record(attached, expected) {
            return Err(ExtractError::TypeMismatch {
                expected: S::Target::type_name(),
            }
            .into());
        }

        unsafe { S::extract_raw(block.payload()) }.map_err(BindError::from)
    }

    /// Collect a block, running its finalize hook at most once.
    ///
    /// Returns `true` if a live block was collected; collecting a stale
    /// handle is a no-op.
    pub fn collect(&mut self, handle: BlockHandle) -> bool {
        self.heap.collect(handle)
    }

    /// Number of live blocks on the heap.
    pub fn live_count(&self) -> usize {
        self.heap.live_count()
    }

    /// Number of finalize faults captured so far.
    pub fn finalize_fault_count(&self) -> usize {
        self.heap.finalize_fault_count()
    }

    /// Drain the captured finalize faults.
    pub fn take_finalize_faults(&mut self) -> Vec<FinalizeFault> {
        self.heap.take_finalize_faults()
    }

    /// Direct access to the userdata heap.
    pub fn heap(&self) -> &UserdataHeap {
        &self.heap
    }

    /// Direct mutable access to the userdata heap.
    pub fn heap_mut(&mut self) -> &mut UserdataHeap {
        &mut self.heap
    }

    /// Direct access to the type registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }
}
