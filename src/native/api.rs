use crate::error::{OpenAlError, Result};
use crate::sys::*;
use libloading::Library;
use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr;

/// Environment variable naming the OpenAL library file or its directory.
pub const LIBRARY_PATH_ENV: &str = "OPENAL_LIBRARY_PATH";

#[cfg(windows)]
const CANDIDATES: &[&str] = &["OpenAL32.dll", "OpenAL.dll"];
#[cfg(target_os = "macos")]
const CANDIDATES: &[&str] = &["libopenal.dylib", "OpenAL.framework/OpenAL"];
#[cfg(not(any(windows, target_os = "macos")))]
const CANDIDATES: &[&str] = &["libopenal.so.1", "libopenal.so"];

type AlGetError = unsafe extern "C" fn() -> ALenum;
type AlGenObjects = unsafe extern "C" fn(ALsizei, *mut ALuint);
type AlDeleteObjects = unsafe extern "C" fn(ALsizei, *const ALuint);
type AlIsSource = unsafe extern "C" fn(ALuint) -> ALboolean;
type AlSourcef = unsafe extern "C" fn(ALuint, ALenum, ALfloat);
type AlSourcei = unsafe extern "C" fn(ALuint, ALenum, ALint);
type AlSourcefv = unsafe extern "C" fn(ALuint, ALenum, *const ALfloat);
type AlGetSourcef = unsafe extern "C" fn(ALuint, ALenum, *mut ALfloat);
type AlGetSourcei = unsafe extern "C" fn(ALuint, ALenum, *mut ALint);
type AlGetSourcefv = unsafe extern "C" fn(ALuint, ALenum, *mut ALfloat);
type AlSourceCommandv = unsafe extern "C" fn(ALsizei, *const ALuint);
type AlSourceQueueBuffers = unsafe extern "C" fn(ALuint, ALsizei, *const ALuint);
type AlSourceUnqueueBuffers = unsafe extern "C" fn(ALuint, ALsizei, *mut ALuint);
type AlListenerf = unsafe extern "C" fn(ALenum, ALfloat);
type AlListeneri = unsafe extern "C" fn(ALenum, ALint);
type AlListenerfv = unsafe extern "C" fn(ALenum, *const ALfloat);
type AlGetListenerf = unsafe extern "C" fn(ALenum, *mut ALfloat);
type AlGetListenerfv = unsafe extern "C" fn(ALenum, *mut ALfloat);
type AlBufferData = unsafe extern "C" fn(ALuint, ALenum, *const ALvoid, ALsizei, ALsizei);
type AlEnumSetter = unsafe extern "C" fn(ALenum);
type AlFloatSetter = unsafe extern "C" fn(ALfloat);

type AlcOpenDevice = unsafe extern "C" fn(*const ALCchar) -> *mut ALCdevice;
type AlcCloseDevice = unsafe extern "C" fn(*mut ALCdevice) -> ALCboolean;
type AlcCreateContext = unsafe extern "C" fn(*mut ALCdevice, *const ALCint) -> *mut ALCcontext;
type AlcDestroyContext = unsafe extern "C" fn(*mut ALCcontext);
type AlcMakeContextCurrent = unsafe extern "C" fn(*mut ALCcontext) -> ALCboolean;
type AlcProcessContext = unsafe extern "C" fn(*mut ALCcontext);
type AlcGetCurrentContext = unsafe extern "C" fn() -> *mut ALCcontext;
type AlcGetError = unsafe extern "C" fn(*mut ALCdevice) -> ALCenum;
type AlcGetString = unsafe extern "C" fn(*mut ALCdevice, ALCenum) -> *const ALCchar;
type AlcIsExtensionPresent = unsafe extern "C" fn(*mut ALCdevice, *const ALCchar) -> ALCboolean;

/// The OpenAL entry points, resolved once from the shared library.
///
/// The function pointers stay valid for as long as the library handle they
/// were resolved from, which this struct owns.
pub struct OpenAlApi {
    path: PathBuf,

    pub(crate) al_get_error: AlGetError,
    pub(crate) al_gen_sources: AlGenObjects,
    pub(crate) al_delete_sources: AlDeleteObjects,
    pub(crate) al_is_source: AlIsSource,
    pub(crate) al_source_f: AlSourcef,
    pub(crate) al_source_i: AlSourcei,
    pub(crate) al_source_fv: AlSourcefv,
    pub(crate) al_get_source_f: AlGetSourcef,
    pub(crate) al_get_source_i: AlGetSourcei,
    pub(crate) al_get_source_fv: AlGetSourcefv,
    pub(crate) al_source_play_v: AlSourceCommandv,
    pub(crate) al_source_pause_v: AlSourceCommandv,
    pub(crate) al_source_stop_v: AlSourceCommandv,
    pub(crate) al_source_rewind_v: AlSourceCommandv,
    pub(crate) al_source_queue_buffers: AlSourceQueueBuffers,
    pub(crate) al_source_unqueue_buffers: AlSourceUnqueueBuffers,
    pub(crate) al_listener_f: AlListenerf,
    pub(crate) al_listener_i: AlListeneri,
    pub(crate) al_listener_fv: AlListenerfv,
    pub(crate) al_get_listener_f: AlGetListenerf,
    pub(crate) al_get_listener_fv: AlGetListenerfv,
    pub(crate) al_gen_buffers: AlGenObjects,
    pub(crate) al_delete_buffers: AlDeleteObjects,
    pub(crate) al_buffer_data: AlBufferData,
    pub(crate) al_distance_model: AlEnumSetter,
    pub(crate) al_doppler_factor: AlFloatSetter,
    pub(crate) al_speed_of_sound: AlFloatSetter,

    pub(crate) alc_open_device: AlcOpenDevice,
    pub(crate) alc_close_device: AlcCloseDevice,
    pub(crate) alc_create_context: AlcCreateContext,
    pub(crate) alc_destroy_context: AlcDestroyContext,
    pub(crate) alc_make_context_current: AlcMakeContextCurrent,
    pub(crate) alc_process_context: AlcProcessContext,
    pub(crate) alc_get_current_context: AlcGetCurrentContext,
    pub(crate) alc_get_error: AlcGetError,
    pub(crate) alc_get_string: AlcGetString,
    pub(crate) alc_is_extension_present: AlcIsExtensionPresent,

    _lib: Library,
}

macro_rules! symbol {
    ($lib:expr, $name:literal) => {
        load_symbol($lib, $name, concat!($name, "\0").as_bytes())?
    };
}

impl OpenAlApi {
    /// Loads the OpenAL library and resolves every entry point.
    ///
    /// `explicit` is tried first, then [`LIBRARY_PATH_ENV`], then the
    /// platform's usual library names next to the executable and on the
    /// loader's search path.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (lib, path) = open_library(explicit)?;

        // SAFETY: each symbol is resolved with the signature declared in `al.h`
        // or `alc.h`, and `lib` outlives the pointers since both move into the
        // returned struct.
        unsafe {
            Ok(Self {
                al_get_error: symbol!(&lib, "alGetError"),
                al_gen_sources: symbol!(&lib, "alGenSources"),
                al_delete_sources: symbol!(&lib, "alDeleteSources"),
                al_is_source: symbol!(&lib, "alIsSource"),
                al_source_f: symbol!(&lib, "alSourcef"),
                al_source_i: symbol!(&lib, "alSourcei"),
                al_source_fv: symbol!(&lib, "alSourcefv"),
                al_get_source_f: symbol!(&lib, "alGetSourcef"),
                al_get_source_i: symbol!(&lib, "alGetSourcei"),
                al_get_source_fv: symbol!(&lib, "alGetSourcefv"),
                al_source_play_v: symbol!(&lib, "alSourcePlayv"),
                al_source_pause_v: symbol!(&lib, "alSourcePausev"),
                al_source_stop_v: symbol!(&lib, "alSourceStopv"),
                al_source_rewind_v: symbol!(&lib, "alSourceRewindv"),
                al_source_queue_buffers: symbol!(&lib, "alSourceQueueBuffers"),
                al_source_unqueue_buffers: symbol!(&lib, "alSourceUnqueueBuffers"),
                al_listener_f: symbol!(&lib, "alListenerf"),
                al_listener_i: symbol!(&lib, "alListeneri"),
                al_listener_fv: symbol!(&lib, "alListenerfv"),
                al_get_listener_f: symbol!(&lib, "alGetListenerf"),
                al_get_listener_fv: symbol!(&lib, "alGetListenerfv"),
                al_gen_buffers: symbol!(&lib, "alGenBuffers"),
                al_delete_buffers: symbol!(&lib, "alDeleteBuffers"),
                al_buffer_data: symbol!(&lib, "alBufferData"),
                al_distance_model: symbol!(&lib, "alDistanceModel"),
                al_doppler_factor: symbol!(&lib, "alDopplerFactor"),
                al_speed_of_sound: symbol!(&lib, "alSpeedOfSound"),
                alc_open_device: symbol!(&lib, "alcOpenDevice"),
                alc_close_device: symbol!(&lib, "alcCloseDevice"),
                alc_create_context: symbol!(&lib, "alcCreateContext"),
                alc_destroy_context: symbol!(&lib, "alcDestroyContext"),
                alc_make_context_current: symbol!(&lib, "alcMakeContextCurrent"),
                alc_process_context: symbol!(&lib, "alcProcessContext"),
                alc_get_current_context: symbol!(&lib, "alcGetCurrentContext"),
                alc_get_error: symbol!(&lib, "alcGetError"),
                alc_get_string: symbol!(&lib, "alcGetString"),
                alc_is_extension_present: symbol!(&lib, "alcIsExtensionPresent"),
                path,
                _lib: lib,
            })
        }
    }

    /// Where the library was loaded from.
    pub fn library_path(&self) -> &Path {
        &self.path
    }

    /// Names of the available output devices.
    pub fn device_names(&self) -> Vec<String> {
        let all = self.has_extension(ptr::null_mut(), c"ALC_ENUMERATE_ALL_EXT");
        let specifier = if all {
            ALC_ALL_DEVICES_SPECIFIER
        } else {
            ALC_DEVICE_SPECIFIER
        };
        // SAFETY: a null device is valid for the device specifier queries, the
        // returned list is owned by the library.
        let list = unsafe { (self.alc_get_string)(ptr::null_mut(), specifier) };
        unsafe { parse_string_list(list) }
    }

    pub(crate) fn has_extension(&self, device: *mut ALCdevice, name: &CStr) -> bool {
        unsafe { (self.alc_is_extension_present)(device, name.as_ptr()) == ALC_TRUE }
    }

    /// The specifier string of `device`, if the library reports one.
    pub(crate) fn device_specifier(&self, device: *mut ALCdevice) -> Option<String> {
        let name = unsafe { (self.alc_get_string)(device, ALC_DEVICE_SPECIFIER) };
        if name.is_null() {
            return None;
        }
        // SAFETY: non-null strings from alcGetString are nul-terminated.
        Some(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
    }
}

impl std::fmt::Debug for OpenAlApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAlApi").field("path", &self.path).finish()
    }
}

unsafe fn load_symbol<T: Copy>(lib: &Library, name: &'static str, symbol: &[u8]) -> Result<T> {
    unsafe { lib.get::<T>(symbol) }
        .map(|sym| *sym)
        .map_err(|_| OpenAlError::MissingSymbol(name))
}

/// Library candidates in lookup order.
fn candidate_paths(explicit: Option<&Path>, env: Option<PathBuf>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
    }
    if let Some(path) = env {
        if path.is_dir() {
            paths.extend(CANDIDATES.iter().map(|name| path.join(name)));
        } else {
            paths.push(path);
        }
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.extend(CANDIDATES.iter().map(|name| exe_dir.join(name)));
    }
    paths.extend(CANDIDATES.iter().map(PathBuf::from));
    paths
}

fn open_library(explicit: Option<&Path>) -> Result<(Library, PathBuf)> {
    let env = std::env::var_os(LIBRARY_PATH_ENV).map(PathBuf::from);
    let mut failures = Vec::new();
    for candidate in candidate_paths(explicit, env) {
        // SAFETY: loading OpenAL runs no initialisation with requirements on
        // the caller.
        match unsafe { Library::new(&candidate) } {
            Ok(lib) => {
                log::debug!("Loaded OpenAL library {}", candidate.display());
                return Ok((lib, candidate));
            }
            Err(err) => {
                log::debug!("Failed to load {}: {}", candidate.display(), err);
                failures.push(format!("{}: {}", candidate.display(), err));
            }
        }
    }
    Err(OpenAlError::LibraryLoad(failures.join("; ")))
}

/// Splits a list of nul-separated strings ending in a double nul.
unsafe fn parse_string_list(mut list: *const ALCchar) -> Vec<String> {
    let mut names = Vec::new();
    if list.is_null() {
        return names;
    }
    loop {
        let entry = unsafe { CStr::from_ptr(list) };
        let len = entry.to_bytes().len();
        if len == 0 {
            break;
        }
        names.push(entry.to_string_lossy().into_owned());
        list = unsafe { list.add(len + 1) };
    }
    names
}

/// Converts a device name for `alcOpenDevice`.
pub(crate) fn device_name_arg(name: Option<&str>) -> Result<Option<CString>> {
    name.map(|name| {
        CString::new(name).map_err(|_| OpenAlError::DeviceOpen(Some(name.to_string())))
    })
    .transpose()
}
