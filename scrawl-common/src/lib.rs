pub mod forms;
pub mod model;
pub mod pagination;
