//! One user action, one engine call.
//!
//! The toolbar of the editor selects tools by name. [`Operation`] turns
//! that name plus the collected parameters into a single call against the
//! filter library, and supplies the label stored in the edit history.

use std::fmt;
use std::str::FromStr;

use crate::buffer::PixelBuffer;
use crate::config::{BlurParams, CannyParams};
use crate::error::{EngineError, Result};
use crate::filters::{self, edge::FIND_EDGES_THRESHOLD};

/// A filter invocation with its parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    Invert,
    Grayscale,
    Brightness(f32),
    Blur(BlurParams),
    Sobel,
    Prewitt,
    Laplacian,
    Canny(CannyParams),
    FindEdges,
}

impl Operation {
    /// Run the operation on `image`, returning a new buffer.
    pub fn apply(&self, image: &PixelBuffer) -> Result<PixelBuffer> {
        match self {
            Self::Invert => Ok(filters::invert(image)),
            Self::Grayscale => Ok(filters::grayscale(image)),
            Self::Brightness(factor) => filters::brightness(image, *factor),
            Self::Blur(params) => filters::blur(image, params),
            Self::Sobel => Ok(filters::sobel(image)),
            Self::Prewitt => Ok(filters::prewitt(image)),
            Self::Laplacian => Ok(filters::laplacian(image)),
            Self::Canny(params) => filters::canny(image, params),
            Self::FindEdges => Ok(filters::find_edges(image, FIND_EDGES_THRESHOLD)),
        }
    }

    /// Tool name, also used as the history label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::Grayscale => "grayscale",
            Self::Brightness(_) => "brightness",
            Self::Blur(_) => "blur",
            Self::Sobel => "sobel",
            Self::Prewitt => "prewitt",
            Self::Laplacian => "laplacian",
            Self::Canny(_) => "canny",
            Self::FindEdges => "edges",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a tool name with default parameters.
impl FromStr for Operation {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "invert" => Self::Invert,
            "grayscale" | "greyscale" => Self::Grayscale,
            "brightness" => Self::Brightness(0.0),
            "blur" => Self::Blur(BlurParams::default()),
            "sobel" => Self::Sobel,
            "prewitt" => Self::Prewitt,
            "laplacian" => Self::Laplacian,
            "canny" => Self::Canny(CannyParams::default()),
            "edges" | "find_edges" => Self::FindEdges,
            other => {
                return Err(EngineError::invalid(
                    "operation",
                    format!("unknown tool `{other}`"),
                ))
            }
        };
        Ok(op)
    }
}
