pub mod model;
pub mod password;
pub mod repo;
pub mod reset;
pub mod token;
pub(crate) mod validate;
