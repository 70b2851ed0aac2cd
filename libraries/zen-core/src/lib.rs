//! Desert Zen Core
//!
//! Platform-agnostic domain types, validation, and error handling shared by
//! every Desert Zen library.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Meditation`, `Category`
//! - **Identifiers**: `UserId`, `MeditationId`, `CategoryId`
//! - **Validation**: email/password rules used by the auth flows
//! - **Error Handling**: Unified `ZenError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use zen_core::types::{Meditation, MeditationId, CategoryId};
//!
//! let meditation = Meditation::new(
//!     MeditationId::new("m1"),
//!     "Morning Calm",
//!     CategoryId::new("breath"),
//!     15,
//!     "https://cdn.example.com/calm.mp3",
//! );
//! assert_eq!(meditation.length, "15m");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{Result, ZenError};
pub use types::{Category, CategoryId, Meditation, MeditationId, User, UserId};
