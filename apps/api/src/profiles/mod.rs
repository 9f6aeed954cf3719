// Profile ownership, validation, activation and photo storage.

pub mod completeness;
pub mod handlers;
pub mod patch;
pub mod photo;
pub mod repository;
pub mod validation;
