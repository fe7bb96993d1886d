pub mod applications;
pub mod auth;
pub mod companies;
pub mod experiences;
pub mod jobs;
pub mod json_error;
pub mod reviews;
pub mod rounds;
pub mod system;
pub mod users;
