pub mod config;
pub mod download;
pub mod handlers;
pub mod observability;
pub mod search;
pub mod server;
pub mod storage;

pub use config::{AppConfig, CollectionSettings, ExportConfig, LoggingConfig, ServerConfig};
pub use observability::init_tracing;
pub use search::{QueryDescriptor, QueryNormalizer, SearchDispatcher, SearchError};
pub use server::{AppState, ChemsearchServer, ServerBuilder, build_app};
pub use storage::create_store;
