pub mod method_not_allowed;
pub mod not_found;
