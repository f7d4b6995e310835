//! The seam between the tracked entities and the native library.
//!
//! [`AlBackend`] mirrors the subset of `al.h` / `alc.h` the sink drives. Its
//! methods are as thin as the C calls they stand for: they never fail
//! themselves, failures are reported through the sticky error slot read by
//! [`AlBackend::get_error`]. [`check_al`] turns that slot into a `Result`.

use crate::error::{OpenAlError, Result};
use crate::sys::*;

pub trait AlBackend {
    /// Reads and clears the sticky AL error slot.
    fn get_error(&self) -> ALenum;

    fn gen_sources(&self, sources: &mut [ALuint]);
    fn delete_sources(&self, sources: &[ALuint]);
    fn is_source(&self, source: ALuint) -> bool;

    fn source_f(&self, source: ALuint, param: ALenum, value: ALfloat);
    fn source_i(&self, source: ALuint, param: ALenum, value: ALint);
    fn source_fv(&self, source: ALuint, param: ALenum, values: &[ALfloat]);
    fn get_source_f(&self, source: ALuint, param: ALenum) -> ALfloat;
    fn get_source_i(&self, source: ALuint, param: ALenum) -> ALint;
    fn get_source_fv(&self, source: ALuint, param: ALenum, values: &mut [ALfloat]);

    fn source_play_v(&self, sources: &[ALuint]);
    fn source_pause_v(&self, sources: &[ALuint]);
    fn source_stop_v(&self, sources: &[ALuint]);
    fn source_rewind_v(&self, sources: &[ALuint]);

    fn source_queue_buffers(&self, source: ALuint, buffers: &[ALuint]);
    fn source_unqueue_buffers(&self, source: ALuint, buffers: &mut [ALuint]);

    fn listener_f(&self, param: ALenum, value: ALfloat);
    fn listener_i(&self, param: ALenum, value: ALint);
    fn listener_fv(&self, param: ALenum, values: &[ALfloat]);
    fn get_listener_f(&self, param: ALenum) -> ALfloat;
    fn get_listener_fv(&self, param: ALenum, values: &mut [ALfloat]);

    fn gen_buffers(&self, buffers: &mut [ALuint]);
    fn delete_buffers(&self, buffers: &[ALuint]);
    fn buffer_data(&self, buffer: ALuint, format: ALenum, data: &[u8], frequency: ALsizei);

    fn distance_model(&self, model: ALenum);
    fn doppler_factor(&self, value: ALfloat);
    fn speed_of_sound(&self, value: ALfloat);

    /// Makes the backend's context current. Returns `false` if the library
    /// refused.
    fn make_current(&self) -> bool;

    /// Lets the library process the state pushed since the last call
    /// (`alcProcessContext`).
    fn process(&self);
}

/// Consumes the sticky error slot, mapping anything but `AL_NO_ERROR` to an
/// [`OpenAlError::ExternalOperation`].
pub fn check_al<B: AlBackend + ?Sized>(backend: &B, context: &'static str) -> Result<()> {
    let code = backend.get_error();
    if code == AL_NO_ERROR {
        return Ok(());
    }
    log::warn!("OpenAL error in {}: {:#x}", context, code);
    Err(OpenAlError::from_al_code(context, code))
}

impl<B: AlBackend + ?Sized> AlBackend for &B {
    fn get_error(&self) -> ALenum {
        (**self).get_error()
    }

    fn gen_sources(&self, sources: &mut [ALuint]) {
        (**self).gen_sources(sources)
    }

    fn delete_sources(&self, sources: &[ALuint]) {
        (**self).delete_sources(sources)
    }

    fn is_source(&self, source: ALuint) -> bool {
        (**self).is_source(source)
    }

    fn source_f(&self, source: ALuint, param: ALenum, value: ALfloat) {
        (**self).source_f(source, param, value)
    }

    fn source_i(&self, source: ALuint, param: ALenum, value: ALint) {
        (**self).source_i(source, param, value)
    }

    fn source_fv(&self, source: ALuint, param: ALenum, values: &[ALfloat]) {
        (**self).source_fv(source, param, values)
    }

    fn get_source_f(&self, source: ALuint, param: ALenum) -> ALfloat {
        (**self).get_source_f(source, param)
    }

    fn get_source_i(&self, source: ALuint, param: ALenum) -> ALint {
        (**self).get_source_i(source, param)
    }

    fn get_source_fv(&self, source: ALuint, param: ALenum, values: &mut [ALfloat]) {
        (**self).get_source_fv(source, param, values)
    }

    fn source_play_v(&self, sources: &[ALuint]) {
        (**self).source_play_v(sources)
    }

    fn source_pause_v(&self, sources: &[ALuint]) {
        (**self).source_pause_v(sources)
    }

    fn source_stop_v(&self, sources: &[ALuint]) {
        (**self).source_stop_v(sources)
    }

    fn source_rewind_v(&self, sources: &[ALuint]) {
        (**self).source_rewind_v(sources)
    }

    fn source_queue_buffers(&self, source: ALuint, buffers: &[ALuint]) {
        (**self).source_queue_buffers(source, buffers)
    }

    fn source_unqueue_buffers(&self, source: ALuint, buffers: &mut [ALuint]) {
        (**self).source_unqueue_buffers(source, buffers)
    }

    fn listener_f(&self, param: ALenum, value: ALfloat) {
        (**self).listener_f(param, value)
    }

    fn listener_i(&self, param: ALenum, value: ALint) {
        (**self).listener_i(param, value)
    }

    fn listener_fv(&self, param: ALenum, values: &[ALfloat]) {
        (**self).listener_fv(param, values)
    }

    fn get_listener_f(&self, param: ALenum) -> ALfloat {
        (**self).get_listener_f(param)
    }

    fn get_listener_fv(&self, param: ALenum, values: &mut [ALfloat]) {
        (**self).get_listener_fv(param, values)
    }

    fn gen_buffers(&self, buffers: &mut [ALuint]) {
        (**self).gen_buffers(buffers)
    }

    fn delete_buffers(&self, buffers: &[ALuint]) {
        (**self).delete_buffers(buffers)
    }

    fn buffer_data(&self, buffer: ALuint, format: ALenum, data: &[u8], frequency: ALsizei) {
        (**self).buffer_data(buffer, format, data, frequency)
    }

    fn distance_model(&self, model: ALenum) {
        (**self).distance_model(model)
    }

    fn doppler_factor(&self, value: ALfloat) {
        (**self).doppler_factor(value)
    }

    fn speed_of_sound(&self, value: ALfloat) {
        (**self).speed_of_sound(value)
    }

    fn make_current(&self) -> bool {
        (**self).make_current()
    }

    fn process(&self) {
        (**self).process()
    }
}
