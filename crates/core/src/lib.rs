pub mod dashboard;
pub mod models;
pub mod parsing;
pub mod tester;
pub mod validation;
