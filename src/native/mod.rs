//! Runtime binding to the system OpenAL library.

mod api;
mod device;

pub use api::{LIBRARY_PATH_ENV, OpenAlApi};
pub use device::OpenAlDevice;
