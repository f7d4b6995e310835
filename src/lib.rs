//! OpenAL bindings with a change-tracked source and listener layer.
//!
//! [`SoundSource`] and [`SoundListener`] record property changes locally;
//! [`SoundSink::update`] delivers everything that changed to the native
//! library in one pass and then lets the context process it. The library is
//! loaded at runtime, see [`native::OpenAlApi::load`] for the lookup order.
//!
//! ```no_run
//! use openal_audio::{SinkConfig, SoundSink, SoundSource, Vec3, load_file};
//!
//! # fn main() -> openal_audio::Result<()> {
//! let mut sink = SoundSink::open(SinkConfig::default())?;
//! let mut source = SoundSource::new();
//! source.set_position(Vec3::new(10.0, 0.0, 0.0)).set_looping(true);
//! source.queue(load_file("sound.wav")?)?;
//!
//! let id = sink.add_source(source);
//! sink.play(id)?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod handle;
pub mod listener;
pub mod math;
pub mod native;
pub mod property;
pub mod sink;
pub mod sound_data;
pub mod source;
pub mod sys;
pub mod tracked;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::AlBackend;
pub use config::{DistanceModel, SinkConfig};
pub use error::{OpenAlError, Result};
pub use handle::SourceHandle;
pub use listener::SoundListener;
pub use math::{Orientation, Pose, Quat, Vec3};
pub use native::OpenAlDevice;
pub use property::{EntityKind, Property, PropertyValue, ValueKind};
pub use sink::{SoundSink, SourceId};
pub use sound_data::{BufferFormat, SoundData, load_file, load_reader};
pub use source::{SoundSource, SourceState};
