pub mod evaporation;
pub mod heat;
pub mod periods;
pub mod vector;
