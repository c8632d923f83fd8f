//! Individual preprocessing steps

pub mod blur;
pub mod grayscale;
pub mod sharpen;
pub mod threshold;
