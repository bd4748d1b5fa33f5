pub mod migrate;
pub mod rules;
