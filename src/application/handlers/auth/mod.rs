//! Authentication handlers.

mod sign_in;
mod sign_out;
mod sign_up;

pub use sign_in::{SignInCommand, SignInHandler, SignInResult};
pub use sign_out::{ResetPasswordCommand, ResetPasswordHandler, SignOutHandler};
pub use sign_up::{SignUpCommand, SignUpHandler, SignUpResult};
