pub mod app;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod heatmap;
pub mod materialize;
pub mod metrics;
pub mod models;
pub mod scale;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;
pub mod window;

pub use app::router;
pub use config::AppConfig;
pub use state::AppState;
pub use storage::JournalStore;
