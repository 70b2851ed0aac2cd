//! Desert Zen - Theme
//!
//! Light and dark palettes and the store that picks between them, following
//! the OS color scheme unless the user toggles it.

mod palette;
mod store;

pub use palette::{Palette, DARK, LIGHT};
pub use store::{ColorScheme, ThemePreference, ThemeStore};
