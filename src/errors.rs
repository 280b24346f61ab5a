//! Centralized error handling for IceTrend
//!
//! This module provides structured error types to replace generic `Box<dyn Error>`
//! throughout the codebase, enabling better error context and type safety.

use std::fmt;

/// Main error type for IceTrend operations
#[derive(Debug)]
pub enum IceTrendError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// Invalid diagnostic configuration (fatal before any output)
    ConfigError(String),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Variable not found in NetCDF file
    VariableNotFound { var: String },

    /// Coordinate axis missing or malformed
    CoordinateError { var: String, message: String },

    /// Time axis could not be decoded
    TimeAxisError(String),

    /// Grid/area resolution errors (shape mismatch, missing auxiliary data)
    GridError(String),

    /// Chart rendering errors
    PlotError(String),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Generic error
    Generic(String),
}

impl fmt::Display for IceTrendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IceTrendError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            IceTrendError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            IceTrendError::IoError(e) => write!(f, "I/O error: {}", e),
            IceTrendError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            IceTrendError::CoordinateError { var, message } => {
                write!(f, "Coordinate error for '{}': {}", var, message)
            }
            IceTrendError::TimeAxisError(msg) => write!(f, "Time axis error: {}", msg),
            IceTrendError::GridError(msg) => write!(f, "Grid error: {}", msg),
            IceTrendError::PlotError(msg) => write!(f, "Plot error: {}", msg),
            IceTrendError::ArrayError(e) => write!(f, "Array error: {}", e),
            IceTrendError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for IceTrendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IceTrendError::NetCDFError(e) => Some(e),
            IceTrendError::IoError(e) => Some(e),
            IceTrendError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for IceTrendError {
    fn from(error: netcdf::Error) -> Self {
        IceTrendError::NetCDFError(error)
    }
}

impl From<std::io::Error> for IceTrendError {
    fn from(error: std::io::Error) -> Self {
        IceTrendError::IoError(error)
    }
}

impl From<ndarray::ShapeError> for IceTrendError {
    fn from(error: ndarray::ShapeError) -> Self {
        IceTrendError::ArrayError(error)
    }
}

impl From<String> for IceTrendError {
    fn from(error: String) -> Self {
        IceTrendError::Generic(error)
    }
}

impl From<&str> for IceTrendError {
    fn from(error: &str) -> Self {
        IceTrendError::Generic(error.to_string())
    }
}

/// Result type alias for IceTrend operations
pub type Result<T> = std::result::Result<T, IceTrendError>;
