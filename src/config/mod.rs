pub mod settings;

pub use settings::OdsSettings;
