//! Environment variable access and expansion
//!
//! The resolver never touches `std::env` directly. It goes through an
//! [`Environment`] so that tests (and hosts with their own variable scopes)
//! can supply one.

mod expand;
mod memory;
mod process;
mod traits;

pub use expand::expand_env_vars;
pub use memory::MemoryEnvironment;
pub use process::ProcessEnvironment;
pub use traits::Environment;
