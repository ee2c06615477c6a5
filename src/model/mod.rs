pub mod input;
pub mod predictor;
pub mod schema;
