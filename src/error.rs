use thiserror::Error;

use crate::types::ElementId;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("damping must be within 0..=1, got {0}")]
    DampingOutOfRange(f32),
    #[error("size ratio denominator must not be zero")]
    ZeroRatioDenominator,
}

/// The surface has not laid out an element yet. Not fatal: the body keeps
/// its last size and is measured again next frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no size for element {element} yet ({width}x{height})")]
pub struct UnknownSize {
    pub element: ElementId,
    pub width: u32,
    pub height: u32,
}
