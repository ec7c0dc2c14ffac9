//! Documents module: upload analysis

pub mod handlers;

pub use handlers::*;
