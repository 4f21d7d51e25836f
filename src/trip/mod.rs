//! Trip module containing member management and expense processing

pub mod core;
pub mod expense;
pub mod member;

pub use core::*;
pub use expense::*;
pub use member::*;
