mod group;
mod interaction;
mod registry;

use std::sync::atomic::{AtomicU64, Ordering};

pub use group::ActionGroup;
pub use interaction::{trigger_interaction, Interactable};
pub use registry::GroupRegistry;

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u64);

impl GroupId {
    /// Process-wide unique id.
    pub(crate) fn allocate() -> Self {
        GroupId(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group#{}", self.0)
    }
}
