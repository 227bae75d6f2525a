pub mod app;
pub mod config;
pub mod logging;
pub mod report;
pub mod session;
pub mod utils;

pub use app::App;
pub use config::AppConfig;
pub use report::OutputFormat;
pub use session::Session;
