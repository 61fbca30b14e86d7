//! Types shared by every Voxgate crate

mod error;

pub use error::HttpError;
