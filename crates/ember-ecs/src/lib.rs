//! Ember ECS - generational row storage
//!
//! Rows (actors, area fields) live in an [`Arena`] and are addressed by a
//! compact generational [`Handle`]. A handle to a removed row never resolves
//! again, even after its slot is reused.

mod arena;
mod entity;

pub use arena::Arena;
pub use entity::Handle;
