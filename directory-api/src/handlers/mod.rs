pub mod admin;
pub mod categories;
pub mod companies;
pub mod search;
pub mod status;
