pub mod application;
pub mod common;
pub mod company;
pub mod experience;
pub mod job;
pub mod option_fields;
pub mod pagination;
pub mod review;
pub mod round;
pub mod token;
pub mod user;
