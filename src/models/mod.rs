pub mod attempt;
pub mod quiz;
