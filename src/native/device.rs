use super::api::{OpenAlApi, device_name_arg};
use crate::backend::AlBackend;
use crate::config::SinkConfig;
use crate::error::{OpenAlError, Result};
use crate::property::{Property, ValueKind};
use crate::sys::*;
use std::cell::Cell;
use std::ptr::{self, NonNull};

/// An open output device together with its rendering context.
///
/// Every [`AlBackend`] call goes to the context that is current, so a process
/// driving more than one device has to call
/// [`SoundSink::activate`](crate::SoundSink::activate) before switching.
#[derive(Debug)]
pub struct OpenAlDevice {
    api: OpenAlApi,
    device: NonNull<ALCdevice>,
    context: NonNull<ALCcontext>,
    name: Option<String>,
    /// Error raised on this side of the FFI boundary, reported by the next
    /// `get_error` ahead of the library's own slot.
    local_error: Cell<ALenum>,
}

impl OpenAlDevice {
    /// Loads the library named by `config` and opens its device.
    pub fn open(config: &SinkConfig) -> Result<Self> {
        let api = OpenAlApi::load(config.library_path.as_deref())?;
        Self::with_api(api, config)
    }

    /// Opens a device and a current context on an already loaded library.
    pub fn with_api(api: OpenAlApi, config: &SinkConfig) -> Result<Self> {
        let name_arg = device_name_arg(config.device_name.as_deref())?;
        let name_ptr = name_arg.as_ref().map_or(ptr::null(), |name| name.as_ptr());

        let device = unsafe { (api.alc_open_device)(name_ptr) };
        let device =
            NonNull::new(device).ok_or_else(|| OpenAlError::DeviceOpen(config.device_name.clone()))?;

        let attributes = config.context_attributes();
        let context = unsafe { (api.alc_create_context)(device.as_ptr(), attributes.as_ptr()) };
        let Some(context) = NonNull::new(context) else {
            let code = unsafe { (api.alc_get_error)(device.as_ptr()) };
            unsafe { (api.alc_close_device)(device.as_ptr()) };
            return Err(OpenAlError::ContextCreate(code));
        };

        let name = api.device_specifier(device.as_ptr());
        let opened = Self {
            api,
            device,
            context,
            name,
            local_error: Cell::new(AL_NO_ERROR),
        };

        if !opened.make_current() {
            // Dropping `opened` destroys the context and closes the device.
            return Err(opened.alc_error("alcMakeContextCurrent"));
        }

        log::info!(
            "Opened OpenAL device {} ({})",
            opened.name.as_deref().unwrap_or("(default)"),
            opened.api.library_path().display()
        );
        Ok(opened)
    }

    pub fn api(&self) -> &OpenAlApi {
        &self.api
    }

    /// Device specifier as reported by the library.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn device_names(&self) -> Vec<String> {
        self.api.device_names()
    }

    /// Reads and clears the device's ALC error slot.
    pub fn check_alc(&self, context: &'static str) -> Result<()> {
        let code = unsafe { (self.api.alc_get_error)(self.device.as_ptr()) };
        if code == ALC_NO_ERROR {
            return Ok(());
        }
        log::warn!("ALC error in {}: {:#x}", context, code);
        Err(OpenAlError::from_alc_code(context, code))
    }

    fn alc_error(&self, context: &'static str) -> OpenAlError {
        match self.check_alc(context) {
            Err(err) => err,
            Ok(()) => OpenAlError::from_alc_code(context, ALC_INVALID_CONTEXT),
        }
    }

    /// Checks that `len` floats cover `param`, raising the AL error otherwise.
    fn fits(&self, param: ALenum, len: usize) -> bool {
        match vector_len_error(param, len) {
            None => true,
            Some(code) => {
                log::warn!(
                    "Refused {} float(s) for parameter {:#x}: {:#x}",
                    len,
                    param,
                    code
                );
                if self.local_error.get() == AL_NO_ERROR {
                    self.local_error.set(code);
                }
                false
            }
        }
    }
}

fn al_len(len: usize) -> ALsizei {
    ALsizei::try_from(len).unwrap_or(ALsizei::MAX)
}

/// The AL error for passing `len` floats to a vector call on `param`, or
/// `None` if the library stays within the slice.
fn vector_len_error(param: ALenum, len: usize) -> Option<ALenum> {
    let needed = match Property::from_code(param).map(Property::kind) {
        Some(ValueKind::Float) => 1,
        Some(ValueKind::Vector) => 3,
        Some(ValueKind::Orientation) => 6,
        Some(ValueKind::Int) | None => return Some(AL_INVALID_ENUM),
    };
    (len < needed).then_some(AL_INVALID_VALUE)
}

impl AlBackend for OpenAlDevice {
    fn get_error(&self) -> ALenum {
        let native = unsafe { (self.api.al_get_error)() };
        match self.local_error.replace(AL_NO_ERROR) {
            AL_NO_ERROR => native,
            local => local,
        }
    }

    fn gen_sources(&self, sources: &mut [ALuint]) {
        unsafe { (self.api.al_gen_sources)(al_len(sources.len()), sources.as_mut_ptr()) }
    }

    fn delete_sources(&self, sources: &[ALuint]) {
        unsafe { (self.api.al_delete_sources)(al_len(sources.len()), sources.as_ptr()) }
    }

    fn is_source(&self, source: ALuint) -> bool {
        unsafe { (self.api.al_is_source)(source) == AL_TRUE }
    }

    fn source_f(&self, source: ALuint, param: ALenum, value: ALfloat) {
        unsafe { (self.api.al_source_f)(source, param, value) }
    }

    fn source_i(&self, source: ALuint, param: ALenum, value: ALint) {
        unsafe { (self.api.al_source_i)(source, param, value) }
    }

    fn source_fv(&self, source: ALuint, param: ALenum, values: &[ALfloat]) {
        if self.fits(param, values.len()) {
            unsafe { (self.api.al_source_fv)(source, param, values.as_ptr()) }
        }
    }

    fn get_source_f(&self, source: ALuint, param: ALenum) -> ALfloat {
        let mut value: ALfloat = 0.0;
        unsafe { (self.api.al_get_source_f)(source, param, &mut value) };
        value
    }

    fn get_source_i(&self, source: ALuint, param: ALenum) -> ALint {
        let mut value: ALint = 0;
        unsafe { (self.api.al_get_source_i)(source, param, &mut value) };
        value
    }

    fn get_source_fv(&self, source: ALuint, param: ALenum, values: &mut [ALfloat]) {
        if self.fits(param, values.len()) {
            unsafe { (self.api.al_get_source_fv)(source, param, values.as_mut_ptr()) }
        }
    }

    fn source_play_v(&self, sources: &[ALuint]) {
        unsafe { (self.api.al_source_play_v)(al_len(sources.len()), sources.as_ptr()) }
    }

    fn source_pause_v(&self, sources: &[ALuint]) {
        unsafe { (self.api.al_source_pause_v)(al_len(sources.len()), sources.as_ptr()) }
    }

    fn source_stop_v(&self, sources: &[ALuint]) {
        unsafe { (self.api.al_source_stop_v)(al_len(sources.len()), sources.as_ptr()) }
    }

    fn source_rewind_v(&self, sources: &[ALuint]) {
        unsafe { (self.api.al_source_rewind_v)(al_len(sources.len()), sources.as_ptr()) }
    }

    fn source_queue_buffers(&self, source: ALuint, buffers: &[ALuint]) {
        unsafe {
            (self.api.al_source_queue_buffers)(source, al_len(buffers.len()), buffers.as_ptr())
        }
    }

    fn source_unqueue_buffers(&self, source: ALuint, buffers: &mut [ALuint]) {
        unsafe {
            (self.api.al_source_unqueue_buffers)(
                source,
                al_len(buffers.len()),
                buffers.as_mut_ptr(),
            )
        }
    }

    fn listener_f(&self, param: ALenum, value: ALfloat) {
        unsafe { (self.api.al_listener_f)(param, value) }
    }

    fn listener_i(&self, param: ALenum, value: ALint) {
        unsafe { (self.api.al_listener_i)(param, value) }
    }

    fn listener_fv(&self, param: ALenum, values: &[ALfloat]) {
        if self.fits(param, values.len()) {
            unsafe { (self.api.al_listener_fv)(param, values.as_ptr()) }
        }
    }

    fn get_listener_f(&self, param: ALenum) -> ALfloat {
        let mut value: ALfloat = 0.0;
        unsafe { (self.api.al_get_listener_f)(param, &mut value) };
        value
    }

    fn get_listener_fv(&self, param: ALenum, values: &mut [ALfloat]) {
        if self.fits(param, values.len()) {
            unsafe { (self.api.al_get_listener_fv)(param, values.as_mut_ptr()) }
        }
    }

    fn gen_buffers(&self, buffers: &mut [ALuint]) {
        unsafe { (self.api.al_gen_buffers)(al_len(buffers.len()), buffers.as_mut_ptr()) }
    }

    fn delete_buffers(&self, buffers: &[ALuint]) {
        unsafe { (self.api.al_delete_buffers)(al_len(buffers.len()), buffers.as_ptr()) }
    }

    fn buffer_data(&self, buffer: ALuint, format: ALenum, data: &[u8], frequency: ALsizei) {
        unsafe {
            (self.api.al_buffer_data)(
                buffer,
                format,
                data.as_ptr().cast(),
                al_len(data.len()),
                frequency,
            )
        }
    }

    fn distance_model(&self, model: ALenum) {
        unsafe { (self.api.al_distance_model)(model) }
    }

    fn doppler_factor(&self, value: ALfloat) {
        unsafe { (self.api.al_doppler_factor)(value) }
    }

    fn speed_of_sound(&self, value: ALfloat) {
        unsafe { (self.api.al_speed_of_sound)(value) }
    }

    fn make_current(&self) -> bool {
        unsafe { (self.api.alc_make_context_current)(self.context.as_ptr()) == ALC_TRUE }
    }

    fn process(&self) {
        unsafe { (self.api.alc_process_context)(self.context.as_ptr()) }
    }
}

impl Drop for OpenAlDevice {
    fn drop(&mut self) {
        unsafe {
            if (self.api.alc_get_current_context)() == self.context.as_ptr() {
                (self.api.alc_make_context_current)(ptr::null_mut());
            }
            (self.api.alc_destroy_context)(self.context.as_ptr());
            (self.api.alc_close_device)(self.device.as_ptr());
        }
        log::info!(
            "Closed OpenAL device {}",
            self.name.as_deref().unwrap_or("(default)")
        );
    }
}
