pub mod member;
pub mod password;
pub mod preference;
pub mod token;
