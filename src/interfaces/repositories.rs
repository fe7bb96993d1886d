pub mod application;
pub mod company;
pub mod experience;
pub mod job;
pub mod review;
pub mod round;
pub mod sqlx_repo;
pub mod token;
pub mod user;
