pub mod outbound;

pub use outbound::PasswordResetNotifier;
