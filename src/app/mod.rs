pub mod backend;
pub mod errors;
pub mod factory;
pub mod pipeline;
pub mod remote;
pub mod task_runner;

pub use backend::BookmarkApi;
pub use errors::AppError;
pub use factory::{App, AppFactory};
pub use pipeline::Pipeline;
pub use task_runner::Dispatched;
