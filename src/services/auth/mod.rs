pub mod credentials;
pub mod login;
pub mod password;
pub mod principal;
pub mod token;

pub use login::LoginService;
pub use principal::Principal;
pub use token::{TokenError, TokenProvider};
