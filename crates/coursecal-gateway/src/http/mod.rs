pub mod courses;
pub mod enroll;
pub mod error;
pub mod health;
pub mod view;
