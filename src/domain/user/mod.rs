//! User domain: profile, age, admin rule and the user document.

mod age;
mod document;
mod profile;

pub use age::Age;
pub use document::UserDocument;
pub use profile::{AdminPolicy, Gender, RegistrationDetails, Role, UserProfile};
