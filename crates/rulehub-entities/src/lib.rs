pub mod types;
pub mod users;
pub mod articles;
pub mod media;
