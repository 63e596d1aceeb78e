//! Bookstore application library
//!
//! Domain modules plus the bootstrap that wires them onto the kernel,
//! database and HTTP crates.

pub mod app;
pub mod modules;

pub use app::Application;
