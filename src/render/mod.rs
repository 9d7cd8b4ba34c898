//! Pixel work for imp.
//!
//! Decoding sources, resampling them onto target canvases (normal or mask),
//! encoding the result, size-capped rendering and contact sheets.

mod contact;
mod encode;
mod padding;
mod scale;

pub use contact::{ContactLayout, ContactSheet, CELL};
pub use encode::{decode, encode, write_bytes, write_image};
pub use padding::{render_within_limit, Rendered, STICKER_SIZE_LIMIT};
pub use scale::{scale_image, ProcessMode, ScaleMode, ScaleOptions};
