pub mod documents;
pub mod identity;
pub mod ports;
pub mod posts;

pub use documents::DocumentProcessor;
pub use identity::{Authorizer, UserService};
pub use ports::PasswordResetNotifier;
pub use posts::PostService;
