pub mod scenario;
pub mod validate;
