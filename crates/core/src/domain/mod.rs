pub mod cuisine;
pub mod location;
pub mod place;
pub mod session;
