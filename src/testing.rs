//! In-memory [`AlBackend`] used by the unit tests.
//!
//! Records every call, keeps a sticky single-slot error like the real library
//! and can be told to fail a property setter or refuse allocations.

use crate::backend::AlBackend;
use crate::sys::*;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GenSources(usize),
    DeleteSources(Vec<ALuint>),
    SourceF(ALuint, ALenum, f32),
    SourceI(ALuint, ALenum, i32),
    SourceFv(ALuint, ALenum, Vec<f32>),
    Play(Vec<ALuint>),
    Pause(Vec<ALuint>),
    Stop(Vec<ALuint>),
    Rewind(Vec<ALuint>),
    QueueBuffers(ALuint, Vec<ALuint>),
    UnqueueBuffers(ALuint, usize),
    ListenerF(ALenum, f32),
    ListenerI(ALenum, i32),
    ListenerFv(ALenum, Vec<f32>),
    GenBuffers(usize),
    DeleteBuffers(Vec<ALuint>),
    BufferData {
        buffer: ALuint,
        format: ALenum,
        len: usize,
        frequency: ALsizei,
    },
    DistanceModel(ALenum),
    DopplerFactor(f32),
    SpeedOfSound(f32),
    MakeCurrent,
    Process,
}

impl Call {
    pub(crate) fn is_property_setter(&self) -> bool {
        matches!(
            self,
            Call::SourceF(..)
                | Call::SourceI(..)
                | Call::SourceFv(..)
                | Call::ListenerF(..)
                | Call::ListenerI(..)
                | Call::ListenerFv(..)
        )
    }
}

#[derive(Default)]
pub(crate) struct MockBackend {
    calls: RefCell<Vec<Call>>,
    error: Cell<ALenum>,
    next_id: Cell<ALuint>,
    source_ints: RefCell<HashMap<(ALuint, ALenum), ALint>>,
    source_floats: RefCell<HashMap<(ALuint, ALenum), Vec<f32>>>,
    listener_floats: RefCell<HashMap<ALenum, Vec<f32>>>,
    queued: RefCell<HashMap<ALuint, Vec<ALuint>>>,
    deleted_sources: RefCell<HashSet<ALuint>>,
    /// Successful setter calls left before the next one fails, and its code.
    fail_setter: Cell<Option<(usize, ALenum)>>,
    refuse_alloc: Cell<Option<ALenum>>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn setter_calls(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.is_property_setter())
            .cloned()
            .collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Lets `successes` setter calls through, then fails the next one.
    pub(crate) fn fail_setter_after(&self, successes: usize, code: ALenum) {
        self.fail_setter.set(Some((successes, code)));
    }

    pub(crate) fn refuse_allocation(&self, code: Option<ALenum>) {
        self.refuse_alloc.set(code);
    }

    pub(crate) fn set_source_int(&self, source: ALuint, param: ALenum, value: ALint) {
        self.source_ints
            .borrow_mut()
            .insert((source, param), value);
    }

    pub(crate) fn set_source_floats(&self, source: ALuint, param: ALenum, values: &[f32]) {
        self.source_floats
            .borrow_mut()
            .insert((source, param), values.to_vec());
    }

    pub(crate) fn queued_buffers(&self, source: ALuint) -> Vec<ALuint> {
        self.queued
            .borrow()
            .get(&source)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn raise(&self, code: ALenum) {
        // Only the first error is kept until it is read.
        if self.error.get() == AL_NO_ERROR {
            self.error.set(code);
        }
    }

    /// Returns `false` if this setter call is the injected failure.
    fn setter_passes(&self) -> bool {
        match self.fail_setter.get() {
            Some((0, code)) => {
                self.fail_setter.set(None);
                self.raise(code);
                false
            }
            Some((left, code)) => {
                self.fail_setter.set(Some((left - 1, code)));
                true
            }
            None => true,
        }
    }

    fn allocate(&self, ids: &mut [ALuint]) {
        if let Some(code) = self.refuse_alloc.get() {
            self.raise(code);
            return;
        }
        for id in ids.iter_mut() {
            let next = self.next_id.get() + 1;
            self.next_id.set(next);
            *id = next;
        }
    }

    fn set_state(&self, sources: &[ALuint], state: ALenum) {
        for source in sources {
            self.set_source_int(*source, AL_SOURCE_STATE, state);
        }
    }
}

impl AlBackend for MockBackend {
    fn get_error(&self) -> ALenum {
        self.error.replace(AL_NO_ERROR)
    }

    fn gen_sources(&self, sources: &mut [ALuint]) {
        self.record(Call::GenSources(sources.len()));
        self.allocate(sources);
    }

    fn delete_sources(&self, sources: &[ALuint]) {
        self.record(Call::DeleteSources(sources.to_vec()));
        self.deleted_sources
            .borrow_mut()
            .extend(sources.iter().copied());
    }

    fn is_source(&self, source: ALuint) -> bool {
        source != 0
            && source <= self.next_id.get()
            && !self.deleted_sources.borrow().contains(&source)
    }

    fn source_f(&self, source: ALuint, param: ALenum, value: ALfloat) {
        self.record(Call::SourceF(source, param, value));
        if self.setter_passes() {
            self.set_source_floats(source, param, &[value]);
        }
    }

    fn source_i(&self, source: ALuint, param: ALenum, value: ALint) {
        self.record(Call::SourceI(source, param, value));
        if self.setter_passes() {
            if param == AL_BUFFER && value == 0 {
                self.queued.borrow_mut().remove(&source);
            }
            self.set_source_int(source, param, value);
        }
    }

    fn source_fv(&self, source: ALuint, param: ALenum, values: &[ALfloat]) {
        self.record(Call::SourceFv(source, param, values.to_vec()));
        if self.setter_passes() {
            self.set_source_floats(source, param, values);
        }
    }

    fn get_source_f(&self, source: ALuint, param: ALenum) -> ALfloat {
        self.source_floats
            .borrow()
            .get(&(source, param))
            .and_then(|values| values.first().copied())
            .unwrap_or(0.0)
    }

    fn get_source_i(&self, source: ALuint, param: ALenum) -> ALint {
        if param == AL_BUFFERS_QUEUED {
            return self.queued_buffers(source).len() as ALint;
        }
        let default = if param == AL_SOURCE_STATE { AL_INITIAL } else { 0 };
        self.source_ints
            .borrow()
            .get(&(source, param))
            .copied()
            .unwrap_or(default)
    }

    fn get_source_fv(&self, source: ALuint, param: ALenum, values: &mut [ALfloat]) {
        if let Some(stored) = self.source_floats.borrow().get(&(source, param)) {
            for (out, value) in values.iter_mut().zip(stored) {
                *out = *value;
            }
        }
    }

    fn source_play_v(&self, sources: &[ALuint]) {
        self.record(Call::Play(sources.to_vec()));
        self.set_state(sources, AL_PLAYING);
    }

    fn source_pause_v(&self, sources: &[ALuint]) {
        self.record(Call::Pause(sources.to_vec()));
        self.set_state(sources, AL_PAUSED);
    }

    fn source_stop_v(&self, sources: &[ALuint]) {
        self.record(Call::Stop(sources.to_vec()));
        self.set_state(sources, AL_STOPPED);
    }

    fn source_rewind_v(&self, sources: &[ALuint]) {
        self.record(Call::Rewind(sources.to_vec()));
        self.set_state(sources, AL_INITIAL);
    }

    fn source_queue_buffers(&self, source: ALuint, buffers: &[ALuint]) {
        self.record(Call::QueueBuffers(source, buffers.to_vec()));
        self.queued
            .borrow_mut()
            .entry(source)
            .or_default()
            .extend_from_slice(buffers);
    }

    fn source_unqueue_buffers(&self, source: ALuint, buffers: &mut [ALuint]) {
        self.record(Call::UnqueueBuffers(source, buffers.len()));
        let mut queued = self.queued.borrow_mut();
        let queue = queued.entry(source).or_default();
        let n = buffers.len();
        if n > queue.len() {
            self.raise(AL_INVALID_VALUE);
            return;
        }
        for (out, buffer) in buffers.iter_mut().zip(queue.drain(..n)) {
            *out = buffer;
        }
    }

    fn listener_f(&self, param: ALenum, value: ALfloat) {
        self.record(Call::ListenerF(param, value));
        if self.setter_passes() {
            self.listener_floats.borrow_mut().insert(param, vec![value]);
        }
    }

    fn listener_i(&self, param: ALenum, value: ALint) {
        self.record(Call::ListenerI(param, value));
        self.setter_passes();
    }

    fn listener_fv(&self, param: ALenum, values: &[ALfloat]) {
        self.record(Call::ListenerFv(param, values.to_vec()));
        if self.setter_passes() {
            self.listener_floats
                .borrow_mut()
                .insert(param, values.to_vec());
        }
    }

    fn get_listener_f(&self, param: ALenum) -> ALfloat {
        self.listener_floats
            .borrow()
            .get(&param)
            .and_then(|values| values.first().copied())
            .unwrap_or(0.0)
    }

    fn get_listener_fv(&self, param: ALenum, values: &mut [ALfloat]) {
        if let Some(stored) = self.listener_floats.borrow().get(&param) {
            for (out, value) in values.iter_mut().zip(stored) {
                *out = *value;
            }
        }
    }

    fn gen_buffers(&self, buffers: &mut [ALuint]) {
        self.record(Call::GenBuffers(buffers.len()));
        self.allocate(buffers);
    }

    fn delete_buffers(&self, buffers: &[ALuint]) {
        self.record(Call::DeleteBuffers(buffers.to_vec()));
    }

    fn buffer_data(&self, buffer: ALuint, format: ALenum, data: &[u8], frequency: ALsizei) {
        self.record(Call::BufferData {
            buffer,
            format,
            len: data.len(),
            frequency,
        });
    }

    fn distance_model(&self, model: ALenum) {
        self.record(Call::DistanceModel(model));
    }

    fn doppler_factor(&self, value: ALfloat) {
        self.record(Call::DopplerFactor(value));
    }

    fn speed_of_sound(&self, value: ALfloat) {
        self.record(Call::SpeedOfSound(value));
    }

    fn make_current(&self) -> bool {
        self.record(Call::MakeCurrent);
        true
    }

    fn process(&self) {
        self.record(Call::Process);
    }
}
