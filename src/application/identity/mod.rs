//! Identity module, covering user management and request authorization
//!
//! `UserService` orchestrates the user use-cases (login, admin CRUD,
//! password reset); `Authorizer` guards the protected endpoints.

pub mod authorizer;
pub mod service;

pub use authorizer::Authorizer;
pub use service::{IssuedToken, NewUser, UserChanges, UserService};
