pub mod task_service;
pub mod task_store;

pub use task_service::TaskService;
pub use task_store::TaskStore;
