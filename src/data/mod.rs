pub mod normalizer;
pub mod observation;
pub mod record;
