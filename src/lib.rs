//! Bookshelf application library
//!
//! Resource modules for books and authors, mounted by the HTTP server.

pub mod modules;

pub use modules::register_all;
