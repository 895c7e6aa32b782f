pub mod config;
pub mod list;
pub mod run;

pub use config::ConfigArgs;
pub use run::RunArgs;
