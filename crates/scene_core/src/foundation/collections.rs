//! Specialized collection types

pub use slotmap::{new_key_type, SecondaryMap, SlotMap};
