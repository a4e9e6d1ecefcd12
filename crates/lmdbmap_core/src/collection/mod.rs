//! Typed table API.
//!
//! Provides [`Map`] and [`Multimap`], generic handles that encode keys and
//! values with the `lmdbmap_codec` traits, plus their position types
//! [`MapIter`] and [`MultimapIter`].

mod map;
mod multimap;

pub use map::{Map, MapIter};
pub use multimap::{Multimap, MultimapIter};
