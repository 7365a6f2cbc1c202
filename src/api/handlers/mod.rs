pub mod authenticate;
pub mod health;
pub mod me;
pub mod resources;
pub mod signup;
