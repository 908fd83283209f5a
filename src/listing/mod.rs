pub mod commands;
pub mod model;
pub mod money;
pub mod queries;
pub mod rules;
pub mod views;
