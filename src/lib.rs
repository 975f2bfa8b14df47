//! Bookshelf application library
//!
//! Application modules (auth, books) and the [`App`] that wires them onto the
//! kernel, the database and the HTTP server.

pub mod app;
pub mod modules;
pub mod utils;

pub use app::App;
