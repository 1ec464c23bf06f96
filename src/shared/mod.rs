pub mod constants;
pub mod templates;
pub mod test_helpers;
pub mod text;
pub mod types;
pub mod validation;
