//! Generational arena for opaque userdata blocks.
//!
//! The heap is the runtime-side store the binding layer calls into: it
//! allocates a block of payload bytes with an attached descriptor record,
//! hands back a generational [`BlockHandle`], and runs the descriptor's
//! finalize hook when the block is collected. Generations make stale handles
//! detectable: a collected block's slot is reused, but any surviving handle
//! to the old tenant misses the generation check and is refused instead of
//! dereferenced.
//!
//! Finalize hooks run at most once per block and never propagate a panic
//! past the collection boundary - a faulting hook is captured into a
//! [`FinalizeFault`] record, since the collector has no recovery path for
//! an error raised mid-finalization.

use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};
use std::fmt;
use std::ptr::NonNull;

use crate::descriptor::DescriptorRef;
use crate::error::FinalizeFault;
use crate::memory::{RawAddr, Void};
use crate::meta_slot::MetaSlot;

/// Handle to a block in the [`UserdataHeap`].
///
/// Safe and copyable; the generational index prevents use-after-collect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    /// Index into the heap's slot vector.
    pub index: u32,
    /// Generation for use-after-collect detection.
    pub generation: u32,
}

impl BlockHandle {
    /// Create a new block handle.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// One opaque block: raw payload bytes plus an optional attached descriptor.
///
/// The block's `Drop` only releases the payload *storage*. Destroying the
/// payload *contents* is exclusively the finalize hook's job: raw-pointer
/// payloads and foreign blocks have no destructor at all, and the hook for
/// owning payloads runs the destructor in place before the storage goes.
pub struct UserdataBlock {
    data: NonNull<u8>,
    layout: Layout,
    descriptor: Option<DescriptorRef>,
    finalized: bool,
}

impl UserdataBlock {
    fn new(layout: Layout, descriptor: Option<DescriptorRef>) -> Self {
        let data = if layout.size() == 0 {
            // Zero-sized payloads get a well-aligned dangling address.
            NonNull::new(layout.align() as *mut u8).expect("layout alignment is never zero")
        } else {
            let ptr = unsafe { alloc(layout) };
            match NonNull::new(ptr) {
                Some(ptr) => ptr,
                None => handle_alloc_error(layout),
            }
        };
        Self {
            data,
            layout,
            descriptor,
            finalized: false,
        }
    }

    /// Address of the payload bytes.
    pub fn payload(&self) -> RawAddr {
        RawAddr::from_mut(self.data.as_ptr() as *mut Void)
    }

    /// The attached descriptor record, if any.
    ///
    /// A block without a descriptor is foreign to the binding layer and is
    /// never accepted by validation.
    pub fn descriptor(&self) -> Option<&DescriptorRef> {
        self.descriptor.as_ref()
    }

    /// Layout of the payload bytes.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl Drop for UserdataBlock {
    fn drop(&mut self) {
        if self.layout.size() > 0 {
            unsafe { dealloc(self.data.as_ptr(), self.layout) }
        }
    }
}

struct HeapSlot {
    generation: u32,
    block: Option<UserdataBlock>,
}

/// Heap storage for opaque blocks with generational indices.
pub struct UserdataHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
    faults: Vec<FinalizeFault>,
}

impl UserdataHeap {
    /// Create a new empty heap.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// Allocate a block of `layout` bytes with `descriptor` attached.
    ///
    /// The payload bytes are uninitialized; the caller writes them through
    /// [`UserdataHeap::payload_addr`] before the block is ever extracted.
    pub fn allocate(&mut self, layout: Layout, descriptor: Option<DescriptorRef>) -> BlockHandle {
        let block = UserdataBlock::new(layout, descriptor);

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.block = Some(block);
            BlockHandle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(HeapSlot {
                generation: 0,
                block: Some(block),
            });
            BlockHandle::new(index, 0)
        }
    }

    /// Get a reference to a live block.
    ///
    /// Returns `None` if the handle is stale.
    pub fn get(&self, handle: BlockHandle) -> Option<&UserdataBlock> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.block.as_ref()
    }

    /// Get a mutable reference to a live block.
    ///
    /// Returns `None` if the handle is stale.
    pub fn get_mut(&mut self, handle: BlockHandle) -> Option<&mut UserdataBlock> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.block.as_mut()
    }

    /// Payload address of a live block.
    pub fn payload_addr(&self, handle: BlockHandle) -> Option<RawAddr> {
        self.get(handle).map(UserdataBlock::payload)
    }

    /// Collect a block: run its finalize hook (at most once), release its
    /// storage, and retire the handle's generation.
    ///
    /// Returns `true` if a live block was collected. Collecting a stale
    /// handle is a no-op - the finalize hook is never re-invoked.
    pub fn collect(&mut self, handle: BlockHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation {
            return false;
        }
        let Some(mut block) = slot.block.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        Self::run_finalizer(&mut block, &mut self.faults);
        true
    }

    /// Number of live blocks.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.block.is_some()).count()
    }

    /// Number of finalize faults captured so far.
    pub fn finalize_fault_count(&self) -> usize {
        self.faults.len()
    }

    /// Drain the captured finalize faults.
    pub fn take_finalize_faults(&mut self) -> Vec<FinalizeFault> {
        std::mem::take(&mut self.faults)
    }

    fn run_finalizer(block: &mut UserdataBlock, faults: &mut Vec<FinalizeFault>) {
        if block.finalized {
            return;
        }
        block.finalized = true;
        let Some(desc) = block.descriptor.clone() else {
            return;
        };
        let addr = block.payload();
        let outcome = desc.with_slot(MetaSlot::Finalize, |hook| {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| hook(addr)))
        });
        if let Some(Err(payload)) = outcome {
            faults.push(FinalizeFault {
                type_name: desc.type_name(),
                message: panic_message(payload),
            });
        }
    }
}

impl Default for UserdataHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UserdataHeap {
    /// Heap teardown collects every live block, so pending finalizers run
    /// at runtime shutdown.
    fn drop(&mut self) {
        for slot in &mut self.slots {
            if let Some(block) = slot.block.as_mut() {
                Self::run_finalizer(block, &mut self.faults);
            }
        }
    }
}

impl fmt::Debug for UserdataHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserdataHeap")
            .field("slot_count", &self.slots.len())
            .field("live_count", &self.live_count())
            .field("fault_count", &self.faults.len())
            .finish()
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::type_hash::TypeHash;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_descriptor(drops: &Rc<Cell<u32>>) -> DescriptorRef {
        let desc = TypeDescriptor::new("Probe", TypeHash::from_name("Probe"));
        let drops = Rc::clone(drops);
        desc.install_slot(
            MetaSlot::Finalize,
            Box::new(move |addr| {
                drops.set(drops.get() + 1);
                unsafe { addr.drop_in_place::<u32>() }
            }),
        );
        Rc::new(desc)
    }

    fn write_u32(heap: &UserdataHeap, handle: BlockHandle, value: u32) {
        let addr = heap.payload_addr(handle).unwrap();
        unsafe { addr.write(value) };
    }

    #[test]
    fn allocate_and_read_back() {
        let mut heap = UserdataHeap::new();
        let handle = heap.allocate(Layout::new::<u32>(), None);
        write_u32(&heap, handle, 99);

        let block = heap.get(handle).unwrap();
        assert_eq!(unsafe { *block.payload().as_ref::<u32>() }, 99);
        assert_eq!(block.layout(), Layout::new::<u32>());
        assert!(block.descriptor().is_none());
        assert_eq!(heap.live_count(), 1);
    }

    #[test]
    fn collect_runs_finalizer_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let mut heap = UserdataHeap::new();
        let handle = heap.allocate(Layout::new::<u32>(), Some(counting_descriptor(&drops)));
        write_u32(&heap, handle, 1);

        assert!(heap.collect(handle));
        assert_eq!(drops.get(), 1);

        // A second collection attempt is a stale no-op.
        assert!(!heap.collect(handle));
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn get_mut_reaches_the_same_block() {
        let mut heap = UserdataHeap::new();
        let handle = heap.allocate(Layout::new::<u32>(), None);
        write_u32(&heap, handle, 1);

        let block = heap.get_mut(handle).unwrap();
        unsafe { block.payload().write(5u32) };

        let block = heap.get(handle).unwrap();
        assert_eq!(unsafe { *block.payload().as_ref::<u32>() }, 5);
    }

    #[test]
    fn collect_without_descriptor_runs_nothing() {
        let mut heap = UserdataHeap::new();
        let handle = heap.allocate(Layout::new::<u32>(), None);
        write_u32(&heap, handle, 1);

        assert!(heap.collect(handle));
        assert_eq!(heap.finalize_fault_count(), 0);
    }

    #[test]
    fn stale_handle_is_refused_after_slot_reuse() {
        let drops = Rc::new(Cell::new(0));
        let mut heap = UserdataHeap::new();
        let first = heap.allocate(Layout::new::<u32>(), Some(counting_descriptor(&drops)));
        write_u32(&heap, first, 1);
        heap.collect(first);

        let second = heap.allocate(Layout::new::<u32>(), Some(counting_descriptor(&drops)));
        write_u32(&heap, second, 2);

        // Same slot, new generation.
        assert_eq!(second.index, first.index);
        assert_ne!(second.generation, first.generation);
        assert!(heap.get(first).is_none());
        assert!(heap.get(second).is_some());
    }

    #[test]
    fn faulting_finalizer_is_swallowed_and_recorded() {
        let desc = TypeDescriptor::new("Bomb", TypeHash::from_name("Bomb"));
        desc.install_slot(MetaSlot::Finalize, Box::new(|_| panic!("boom")));

        let mut heap = UserdataHeap::new();
        let handle = heap.allocate(Layout::new::<u32>(), Some(Rc::new(desc)));
        write_u32(&heap, handle, 1);

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        let collected = heap.collect(handle);
        std::panic::set_hook(prev_hook);

        assert!(collected);
        assert_eq!(heap.finalize_fault_count(), 1);

        let faults = heap.take_finalize_faults();
        assert_eq!(faults[0].type_name, "Bomb");
        assert_eq!(faults[0].message, "boom");
        assert_eq!(heap.finalize_fault_count(), 0);
    }

    #[test]
    fn heap_teardown_collects_live_blocks() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut heap = UserdataHeap::new();
            let a = heap.allocate(Layout::new::<u32>(), Some(counting_descriptor(&drops)));
            let b = heap.allocate(Layout::new::<u32>(), Some(counting_descriptor(&drops)));
            write_u32(&heap, a, 1);
            write_u32(&heap, b, 2);
            heap.collect(a);
            assert_eq!(drops.get(), 1);
        }
        // Dropping the heap finalized the remaining block, once.
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn zero_sized_payloads_are_supported() {
        let mut heap = UserdataHeap::new();
        let handle = heap.allocate(Layout::new::<()>(), None);
        assert!(heap.get(handle).is_some());
        assert!(heap.collect(handle));
    }

    #[test]
    fn heap_debug_shows_counts() {
        let mut heap = UserdataHeap::new();
        heap.allocate(Layout::new::<u32>(), None);
        let debug = format!("{:?}", heap);
        assert!(debug.contains("live_count: 1"));
    }
}
