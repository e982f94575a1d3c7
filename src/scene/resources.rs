// Render resource ledger
//
// Tracks every backend resource a scene allocates so disposal can be
// verified. Cloning the ledger shares it; the visualizer is single-threaded,
// so shared ownership is Rc + RefCell.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Handle to one allocated render resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

/// What a resource backs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    NodeProxy,
    EdgeLine,
}

#[derive(Debug, Default)]
struct LedgerState {
    next_id: u64,
    allocated_total: u64,
    live: HashMap<ResourceId, ResourceKind>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceLedger {
    state: Rc<RefCell<LedgerState>>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self, kind: ResourceKind) -> ResourceId {
        let mut state = self.state.borrow_mut();
        let id = ResourceId(state.next_id);
        state.next_id += 1;
        state.allocated_total += 1;
        state.live.insert(id, kind);
        id
    }

    /// Release a resource; returns false if it was not live
    pub fn release(&self, id: ResourceId) -> bool {
        self.state.borrow_mut().live.remove(&id).is_some()
    }

    /// Number of resources currently allocated
    pub fn live(&self) -> usize {
        self.state.borrow().live.len()
    }

    #[cfg(test)]
    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.state
            .borrow()
            .live
            .values()
            .filter(|k| **k == kind)
            .count()
    }

    /// Number of allocations ever made through this ledger
    pub fn allocated_total(&self) -> u64 {
        self.state.borrow().allocated_total
    }
}
