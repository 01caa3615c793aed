pub mod api;
pub mod chains;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod self_check;

pub use api::{build_router, start_api_server};
pub use config::NodeConfig;
pub use error::ApiError;
pub use metrics::Metrics;
pub use node::BountyNode;
pub use self_check::{SelfCheckOrchestrator, SelfCheckRequest, SelfCheckState};
