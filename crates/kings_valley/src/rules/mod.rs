//! Game rules for King's Valley.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are kept apart from
//! board storage so the engine and contracts can compose them.

pub mod slide;
pub mod win;

pub use slide::{check_move, is_legal, legal_destinations, slide_destination};
pub use win::winner;
