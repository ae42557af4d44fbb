mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AuthSettings, BaselineSettings, DatabaseBackend, DatabaseSettings, ServerSettings, Settings,
    StorageSettings, WorkerSettings,
};
