//! Data models

pub mod cart;
pub mod codes;
pub mod overflow_item;

pub use cart::{Cart, Hold};
pub use codes::{Audience, Branch, ItemType, Language, MatCat, ShelfCode, System};
pub use overflow_item::{CartRow, NewOverflowItem, OverflowItem};
