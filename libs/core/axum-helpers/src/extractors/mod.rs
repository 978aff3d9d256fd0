//! Request extractors that reject with [`AppError`](crate::AppError) JSON bodies.

pub mod text_path;

pub use text_path::TextPath;
