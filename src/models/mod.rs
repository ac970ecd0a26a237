pub mod map;
pub mod place;
pub mod restaurant;
pub mod session;
