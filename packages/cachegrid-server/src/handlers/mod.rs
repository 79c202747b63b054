//! HTTP handlers, grouped by the resource they serve.

mod admin;
mod batch;
mod cache;
mod health;
mod info;

pub use admin::list_keys_handler;
pub use batch::{batch_get_handler, batch_set_handler};
pub use cache::{
    clear_cache_handler, delete_cache_handler, get_cache_handler, post_cache_handler,
    set_cache_handler,
};
pub use health::{health_handler, liveness_handler, readiness_handler, stats_handler};
pub use info::root_handler;
