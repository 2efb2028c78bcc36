//! Request handlers.

pub mod health;
pub mod index;
pub mod transcript;

pub use health::*;
pub use index::*;
pub use transcript::*;
