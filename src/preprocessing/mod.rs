//! Image preprocessing for tabulation-sheet OCR
//!
//! A fixed grayscale, blur, unsharp-mask and threshold sequence that turns a
//! photographed sheet into a clean binary image.

pub mod pipeline;
pub mod steps;

pub use pipeline::Pipeline;
