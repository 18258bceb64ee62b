//! GlucoGuard HTTP Module
//! Interactive form, report downloads and the JSON assessment API

pub mod handlers;
pub mod middleware;
pub mod page;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::start_cleanup_task;
pub use routes::create_router;
pub use types::*;
