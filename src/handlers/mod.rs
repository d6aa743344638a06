pub mod api;
pub mod health;
pub mod metrics;
pub mod middleware;

pub use api::*;
pub use health::*;
pub use metrics::*;
pub use middleware::*;
