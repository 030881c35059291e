//! Error types for the controller system
use thiserror::Error;

use crate::widget::{Property, WidgetId};

/// Controller system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// A controller's synth has no channel mapping
    #[error("Synth not registered: {0}")]
    SynthNotRegistered(String),

    /// Writing a property the widget does not declare
    #[error("Widget {widget} does not declare property {property}")]
    UndeclaredProperty {
        /// Target widget
        widget: WidgetId,
        /// Property that was written
        property: Property,
    },

    /// Property written with a value of the wrong type
    #[error("Wrong value type for property {property} on widget {widget}")]
    PropertyTypeMismatch {
        /// Target widget
        widget: WidgetId,
        /// Property that was written
        property: Property,
    },

    /// Widget id not present in the tree

    #[error("Unknown widget: {0}")]
    UnknownWidget(WidgetId),

    /// Controllers were already wired
    #[error("Controllers already initialised")]
    AlreadyInitialised,

    /// Settings or layout content is invalid
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type for controller operations
pub type Result<T> = std::result::Result<T, ControlError>;
