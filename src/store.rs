//! Plain aggregate of the Node Store and Decision Registry: the shared state
//! every algorithm in this crate (`apply`, `unary`, `subst`, `canon`, `lp`)
//! operates over. `crate::manager::XaddContext` wraps this behind the
//! handle-cloning ergonomics of the public API; this type itself carries no
//! synchronization so that internal algorithms can borrow both tables
//! mutably without going through a lock on every node access.

use crate::decision::DecisionRegistry;
use crate::node::NodeStore;

#[derive(Debug, Default)]
pub struct Store {
    pub nodes: NodeStore,
    pub decisions: DecisionRegistry,
}

impl Store {
    pub fn new() -> Self {
        Store {
            nodes: NodeStore::new(),
            decisions: DecisionRegistry::new(),
        }
    }
}
