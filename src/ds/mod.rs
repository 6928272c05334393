pub mod intrusive_list;
pub mod recency_index;
pub mod slot_arena;

pub use intrusive_list::IntrusiveList;
pub use recency_index::{LinearRecencyIndex, RecencyIndex, SplayRecencyIndex};
pub use slot_arena::{SlotArena, SlotId};
