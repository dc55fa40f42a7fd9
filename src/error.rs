use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to package document: {0}")]
    Package(String),
}

/// An image reference that could not be embedded. Recoverable: the renderer
/// replaces the image with a fallback paragraph.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Not a readable image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Failed to re-encode image {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Failures while reading a `.docx` package back.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a DOCX package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Missing {0} in package")]
    MissingPart(&'static str),

    #[error("Malformed XML in {part}: {source}")]
    Xml {
        part: &'static str,
        source: quick_xml::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
