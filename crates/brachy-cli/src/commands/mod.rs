pub mod plan;
pub mod seeds;
