//! Session module - the access token held on behalf of the signed-in user.

mod session_model;
mod session_traits;

pub use session_model::Session;
pub use session_traits::SessionProviderTrait;
