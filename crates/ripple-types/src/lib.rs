pub mod forms;
pub mod models;
pub mod pagination;
pub mod validation;
