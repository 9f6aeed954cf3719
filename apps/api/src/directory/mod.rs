// Public talent directory: only active profiles are ever visible here.

pub mod handlers;
pub mod query;
pub mod view;
