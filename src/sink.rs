//! The sound sink: owner of a device, its sources and the listener.

use crate::backend::{AlBackend, check_al};
use crate::config::SinkConfig;
use crate::error::{OpenAlError, Result};
use crate::handle::{HandleAllocator, SourceHandle};
use crate::listener::SoundListener;
use crate::native::OpenAlDevice;
use crate::sound_data::SoundData;
use crate::source::SoundSource;
use crate::sys::*;
use crate::tracked::SyncTarget;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identity of a source registered with a [`SoundSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub(crate) u64);

impl SourceId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Play,
    Pause,
    Stop,
    Rewind,
}

impl Command {
    fn name(self) -> &'static str {
        match self {
            Self::Play => "alSourcePlayv",
            Self::Pause => "alSourcePausev",
            Self::Stop => "alSourceStopv",
            Self::Rewind => "alSourceRewindv",
        }
    }
}

/// Plays sources through one OpenAL context.
///
/// Changes made to sources and the listener stay local until
/// [`update`](Self::update) delivers them. The sink owns every native source
/// and buffer it creates and releases them when dropped.
pub struct SoundSink<B: AlBackend = OpenAlDevice> {
    backend: B,
    config: SinkConfig,
    sources: BTreeMap<SourceId, SoundSource>,
    listener: Option<SoundListener>,
    allocator: HandleAllocator,
    /// Buffers queued on each native source, oldest first.
    buffers: HashMap<ALuint, Vec<ALuint>>,
    next_id: u64,
}

impl SoundSink<OpenAlDevice> {
    /// Loads OpenAL, opens the configured device and makes its context
    /// current.
    pub fn open(config: SinkConfig) -> Result<Self> {
        let device = OpenAlDevice::open(&config)?;
        Self::with_backend(device, config)
    }

    /// Names of the output devices the loaded library offers.
    pub fn device_names(&self) -> Vec<String> {
        self.backend.device_names()
    }
}

impl<B: AlBackend> SoundSink<B> {
    pub fn with_backend(backend: B, config: SinkConfig) -> Result<Self> {
        let sink = Self {
            backend,
            config,
            sources: BTreeMap::new(),
            listener: None,
            allocator: HandleAllocator::new(),
            buffers: HashMap::new(),
            next_id: 1,
        };
        sink.activate()?;
        sink.apply_context_settings()?;
        Ok(sink)
    }

    fn apply_context_settings(&self) -> Result<()> {
        if let Some(model) = self.config.distance_model {
            self.backend.distance_model(model.code());
            check_al(&self.backend, "alDistanceModel")?;
        }
        if let Some(factor) = self.config.doppler_factor {
            self.backend.doppler_factor(factor);
            check_al(&self.backend, "alDopplerFactor")?;
        }
        if let Some(speed) = self.config.speed_of_sound {
            self.backend.speed_of_sound(speed);
            check_al(&self.backend, "alSpeedOfSound")?;
        }
        Ok(())
    }

    /// Makes this sink's context the current one.
    pub fn activate(&self) -> Result<()> {
        if self.backend.make_current() {
            Ok(())
        } else {
            Err(OpenAlError::from_alc_code(
                "alcMakeContextCurrent",
                ALC_INVALID_CONTEXT,
            ))
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn listener(&self) -> Option<&SoundListener> {
        self.listener.as_ref()
    }

    /// The listener, created with default values on first use.
    pub fn listener_mut(&mut self) -> &mut SoundListener {
        self.listener.get_or_insert_with(SoundListener::new)
    }

    /// Replaces the listener. All of its stored values are delivered again on
    /// the next update.
    pub fn set_listener(&mut self, mut listener: SoundListener) -> Option<SoundListener> {
        listener.properties_mut().mark_all_dirty();
        self.listener.replace(listener)
    }

    pub fn take_listener(&mut self) -> Option<SoundListener> {
        self.listener.take()
    }

    pub fn add_source(&mut self, source: SoundSource) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        self.sources.insert(id, source);
        id
    }

    pub fn source(&self, id: SourceId) -> Option<&SoundSource> {
        self.sources.get(&id)
    }

    pub fn source_mut(&mut self, id: SourceId) -> Option<&mut SoundSource> {
        self.sources.get_mut(&id)
    }

    pub fn contains_source(&self, id: SourceId) -> bool {
        self.sources.contains_key(&id)
    }

    /// Registered sources in ascending id order.
    pub fn source_ids(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.sources.keys().copied()
    }

    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &SoundSource)> {
        self.sources.iter().map(|(id, source)| (*id, source))
    }

    /// The native handle bound to `id`, if it has been processed.
    pub fn handle_of(&self, id: SourceId) -> Option<SourceHandle> {
        self.allocator.handle_of(id)
    }

    /// Detaches a source. Its native handle goes back to the reuse pool and
    /// keeps playing whatever it was playing.
    pub fn remove_source(&mut self, id: SourceId) -> Option<SoundSource> {
        let mut source = self.sources.remove(&id)?;
        self.allocator.release(id);
        source.properties_mut().mark_all_dirty();
        Some(source)
    }

    /// Detaches a source and deletes its native source and buffers.
    pub fn destroy_source(&mut self, id: SourceId) -> Result<SoundSource> {
        let mut source = self
            .sources
            .remove(&id)
            .ok_or(OpenAlError::UnassociatedEntity(id))?;
        source.properties_mut().mark_all_dirty();

        if let Some(handle) = self.allocator.forget(id) {
            let raw = handle.raw();
            self.backend.source_stop_v(&[raw]);
            self.backend.delete_sources(&[raw]);
            check_al(&self.backend, "alDeleteSources")?;
            if let Some(buffers) = self.buffers.remove(&raw) {
                delete_buffers(&self.backend, &buffers)?;
            }
            log::debug!("Destroyed source handle {} of {}", raw, id);
        }
        Ok(source)
    }

    /// Binds `id` to a native source if needed, then delivers its pending
    /// property changes and sound data.
    pub fn process_source(&mut self, id: SourceId) -> Result<SourceHandle> {
        let source = self
            .sources
            .get_mut(&id)
            .ok_or(OpenAlError::UnassociatedEntity(id))?;

        let acquired = self.allocator.acquire(id, &self.backend)?;
        let raw = acquired.handle.raw();

        if acquired.recycled {
            // Detach the previous owner's queue and undo its settings.
            self.backend.source_i(raw, AL_BUFFER, 0);
            let reset = check_al(&self.backend, "alSourcei").and_then(|()| {
                source
                    .properties()
                    .reset_unstored(&self.backend, SyncTarget::Source(raw))
            });
            if let Err(err) = reset {
                self.allocator.release(id);
                return Err(err);
            }
            if let Some(buffers) = self.buffers.remove(&raw) {
                delete_buffers(&self.backend, &buffers)?;
            }
            source.properties_mut().mark_all_dirty();
        }

        source
            .properties_mut()
            .synchronize(&self.backend, SyncTarget::Source(raw))?;

        while let Some(data) = source.pending_mut().front().cloned() {
            let buffer = upload(&self.backend, &data)?;
            self.backend.source_queue_buffers(raw, &[buffer]);
            if let Err(err) = check_al(&self.backend, "alSourceQueueBuffers") {
                self.backend.delete_buffers(&[buffer]);
                self.backend.get_error();
                return Err(err);
            }
            self.buffers.entry(raw).or_default().push(buffer);
            source.pending_mut().pop_front();
        }

        Ok(acquired.handle)
    }

    /// Delivers every pending change, then lets the context process them.
    ///
    /// Sources go first in ascending id order, the listener after them. The
    /// first failure stops the pass; whatever was not delivered stays pending.
    pub fn update(&mut self) -> Result<()> {
        let ids: Vec<SourceId> = self.sources.keys().copied().collect();
        for id in ids {
            self.process_source(id)?;
        }
        if let Some(listener) = self.listener.as_mut() {
            listener
                .properties_mut()
                .synchronize(&self.backend, SyncTarget::Listener)?;
        }
        self.backend.process();
        Ok(())
    }

    /// Reads every property of a processed source back from the library.
    pub fn refresh(&mut self, id: SourceId) -> Result<()> {
        let handle = self
            .allocator
            .handle_of(id)
            .ok_or(OpenAlError::UnassociatedEntity(id))?;
        let source = self
            .sources
            .get_mut(&id)
            .ok_or(OpenAlError::UnassociatedEntity(id))?;
        source
            .properties_mut()
            .fetch(&self.backend, SyncTarget::Source(handle.raw()))
    }

    /// Reads the listener's properties back from the library.
    pub fn refresh_listener(&mut self) -> Result<()> {
        let listener = self.listener.get_or_insert_with(SoundListener::new);
        listener
            .properties_mut()
            .fetch(&self.backend, SyncTarget::Listener)
    }

    pub fn play(&mut self, id: SourceId) -> Result<()> {
        self.command(&[id], Command::Play)
    }

    pub fn pause(&mut self, id: SourceId) -> Result<()> {
        self.command(&[id], Command::Pause)
    }

    pub fn stop(&mut self, id: SourceId) -> Result<()> {
        self.command(&[id], Command::Stop)
    }

    pub fn rewind(&mut self, id: SourceId) -> Result<()> {
        self.command(&[id], Command::Rewind)
    }

    /// Starts all `ids` with a single native call.
    pub fn play_all(&mut self, ids: &[SourceId]) -> Result<()> {
        self.command(ids, Command::Play)
    }

    pub fn pause_all(&mut self, ids: &[SourceId]) -> Result<()> {
        self.command(ids, Command::Pause)
    }

    pub fn stop_all(&mut self, ids: &[SourceId]) -> Result<()> {
        self.command(ids, Command::Stop)
    }

    pub fn rewind_all(&mut self, ids: &[SourceId]) -> Result<()> {
        self.command(ids, Command::Rewind)
    }

    fn command(&mut self, ids: &[SourceId], command: Command) -> Result<()> {
        let mut handles = Vec::with_capacity(ids.len());
        for id in ids {
            handles.push(self.process_source(*id)?.raw());
        }
        if handles.is_empty() {
            return Ok(());
        }
        match command {
            Command::Play => self.backend.source_play_v(&handles),
            Command::Pause => self.backend.source_pause_v(&handles),
            Command::Stop => self.backend.source_stop_v(&handles),
            Command::Rewind => self.backend.source_rewind_v(&handles),
        }
        check_al(&self.backend, command.name())
    }

    /// Removes the buffers the source has finished playing and deletes them.
    /// Returns how many were removed.
    pub fn unqueue_processed(&mut self, id: SourceId) -> Result<usize> {
        if !self.sources.contains_key(&id) {
            return Err(OpenAlError::UnassociatedEntity(id));
        }
        let raw = self
            .allocator
            .handle_of(id)
            .ok_or(OpenAlError::UnassociatedEntity(id))?
            .raw();

        let processed = self.backend.get_source_i(raw, AL_BUFFERS_PROCESSED);
        check_al(&self.backend, "alGetSourcei")?;
        let count = usize::try_from(processed).unwrap_or(0);
        if count == 0 {
            return Ok(0);
        }

        let mut done = vec![0 as ALuint; count];
        self.backend.source_unqueue_buffers(raw, &mut done);
        check_al(&self.backend, "alSourceUnqueueBuffers")?;
        if let Some(queued) = self.buffers.get_mut(&raw) {
            queued.retain(|buffer| !done.contains(buffer));
        }
        delete_buffers(&self.backend, &done)?;
        log::debug!("Unqueued {} processed buffer(s) from {}", count, id);
        Ok(count)
    }
}

impl<B: AlBackend> Drop for SoundSink<B> {
    fn drop(&mut self) {
        if !self.backend.make_current() {
            log::warn!("Could not make the context current to release sources");
        }
        let handles: Vec<ALuint> = self
            .allocator
            .drain()
            .into_iter()
            .map(SourceHandle::raw)
            .collect();
        if !handles.is_empty() {
            self.backend.source_stop_v(&handles);
            self.backend.delete_sources(&handles);
        }
        let buffers: Vec<ALuint> = self.buffers.drain().flat_map(|(_, b)| b).collect();
        if !buffers.is_empty() {
            self.backend.delete_buffers(&buffers);
        }
        // Errors are logged by check_al; nothing else can be done here.
        let _ = check_al(&self.backend, "SoundSink::drop");
        log::debug!(
            "Released {} source(s) and {} buffer(s)",
            handles.len(),
            buffers.len()
        );
    }
}

impl<B: AlBackend> fmt::Debug for SoundSink<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundSink")
            .field("config", &self.config)
            .field("sources", &self.sources.len())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

/// Copies `data` into a new native buffer.
fn upload<B: AlBackend + ?Sized>(backend: &B, data: &SoundData) -> Result<ALuint> {
    let format = data.format()?;
    let frequency = ALsizei::try_from(data.frequency())
        .map_err(|_| OpenAlError::from_al_code("alBufferData", AL_INVALID_VALUE))?;
    if ALsizei::try_from(data.size()).is_err() {
        return Err(OpenAlError::from_al_code("alBufferData", AL_INVALID_VALUE));
    }

    let mut ids = [0 as ALuint; 1];
    backend.gen_buffers(&mut ids);
    let code = backend.get_error();
    if code != AL_NO_ERROR || ids[0] == 0 {
        log::warn!("alGenBuffers failed: {:#x}", code);
        return Err(OpenAlError::ResourceExhausted {
            resource: "buffer",
            code,
        });
    }
    let buffer = ids[0];

    backend.buffer_data(buffer, format.code(), data.data(), frequency);
    if let Err(err) = check_al(backend, "alBufferData") {
        backend.delete_buffers(&[buffer]);
        backend.get_error();
        return Err(err);
    }
    log::debug!(
        "Uploaded {} bytes ({:?}, {} Hz) to buffer {}",
        data.size(),
        format,
        data.frequency(),
        buffer
    );
    Ok(buffer)
}

fn delete_buffers<B: AlBackend + ?Sized>(backend: &B, buffers: &[ALuint]) -> Result<()> {
    if buffers.is_empty() {
        return Ok(());
    }
    backend.delete_buffers(buffers);
    check_al(backend, "alDeleteBuffers")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceModel;
    use crate::math::Vec3;
    use crate::property::Property;
    use crate::source::SourceState;
    use crate::testing::{Call, MockBackend};

    fn sink(backend: &MockBackend) -> SoundSink<&MockBackend> {
        let sink = SoundSink::with_backend(backend, SinkConfig::default()).unwrap();
        backend.clear_calls();
        sink
    }

    fn mono(len: usize) -> SoundData {
        SoundData::new(vec![0; len], 1, 16, 22050)
    }

    #[test]
    fn test_source_id_display() {
        assert_eq!(SourceId(7).to_string(), "SourceId(7)");
    }

    #[test]
    fn test_with_backend_applies_context_settings() {
        let backend = MockBackend::new();
        let config = SinkConfig::new()
            .distance_model(DistanceModel::InverseClamped)
            .doppler_factor(0.5)
            .speed_of_sound(340.0);
        let _sink = SoundSink::with_backend(&backend, config).unwrap();
        assert_eq!(
            backend.calls(),
            vec![
                Call::MakeCurrent,
                Call::DistanceModel(AL_INVERSE_DISTANCE_CLAMPED),
                Call::DopplerFactor(0.5),
                Call::SpeedOfSound(340.0),
            ]
        );
    }

    #[test]
    fn test_default_source_delivered_in_code_order() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        sink.add_source(SoundSource::new());
        sink.update().unwrap();

        assert_eq!(
            backend.calls(),
            vec![
                Call::GenSources(1),
                Call::SourceF(1, AL_PITCH, 1.0),
                Call::SourceFv(1, AL_POSITION, vec![0.0, 0.0, 0.0]),
                Call::SourceFv(1, AL_VELOCITY, vec![0.0, 0.0, 0.0]),
                Call::SourceF(1, AL_GAIN, 1.0),
                Call::Process,
            ]
        );
    }

    #[test]
    fn test_update_commits_once_after_listener() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let a = sink.add_source(SoundSource::new());
        let b = sink.add_source(SoundSource::new());
        sink.listener_mut().set_gain(0.5);
        sink.update().unwrap();

        let calls = backend.calls();
        assert_eq!(calls.last(), Some(&Call::Process));
        assert_eq!(calls.iter().filter(|c| **c == Call::Process).count(), 1);

        let first_listener = calls
            .iter()
            .position(|c| matches!(c, Call::ListenerF(..) | Call::ListenerFv(..)))
            .unwrap();
        let last_source = calls
            .iter()
            .rposition(|c| matches!(c, Call::SourceF(..) | Call::SourceFv(..)))
            .unwrap();
        assert!(last_source < first_listener);

        assert_eq!(sink.handle_of(a).map(SourceHandle::raw), Some(1));
        assert_eq!(sink.handle_of(b).map(SourceHandle::raw), Some(2));
        assert!(!sink.source(a).unwrap().changed());
        assert!(!sink.listener().unwrap().changed());
    }

    #[test]
    fn test_clean_update_only_commits() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        sink.add_source(SoundSource::new());
        sink.update().unwrap();
        backend.clear_calls();

        sink.update().unwrap();
        assert_eq!(backend.calls(), vec![Call::Process]);
    }

    #[test]
    fn test_failed_update_keeps_changes_and_skips_commit() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let id = sink.add_source(SoundSource::new());
        backend.fail_setter_after(1, AL_INVALID_VALUE);

        let err = sink.update().unwrap_err();
        assert_eq!(err.code(), Some(AL_INVALID_VALUE));
        assert!(!backend.calls().contains(&Call::Process));
        assert_eq!(
            sink.source(id).unwrap().dirty().collect::<Vec<_>>(),
            vec![Property::Position, Property::Velocity, Property::Gain]
        );

        backend.clear_calls();
        sink.update().unwrap();
        assert_eq!(
            backend.setter_calls(),
            vec![
                Call::SourceFv(1, AL_POSITION, vec![0.0, 0.0, 0.0]),
                Call::SourceFv(1, AL_VELOCITY, vec![0.0, 0.0, 0.0]),
                Call::SourceF(1, AL_GAIN, 1.0),
            ]
        );
        assert_eq!(backend.calls().last(), Some(&Call::Process));
    }

    #[test]
    fn test_refresh_requires_processed_source() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);

        let err = sink.refresh(SourceId(42)).unwrap_err();
        assert!(matches!(err, OpenAlError::UnassociatedEntity(SourceId(42))));

        let id = sink.add_source(SoundSource::new());
        let err = sink.refresh(id).unwrap_err();
        assert!(matches!(err, OpenAlError::UnassociatedEntity(found) if found == id));
    }

    #[test]
    fn test_refresh_reads_state_without_dirtying() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let id = sink.add_source(SoundSource::new());
        sink.play(id).unwrap();
        sink.refresh(id).unwrap();

        let source = sink.source(id).unwrap();
        assert_eq!(source.state(), Some(SourceState::Playing));
        assert_eq!(source.gain(), Some(1.0));
        assert!(!source.changed());
    }

    #[test]
    fn test_queued_data_is_uploaded() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let id = sink.add_source(SoundSource::new());
        sink.source_mut(id).unwrap().queue(mono(100)).unwrap();
        sink.update().unwrap();

        let calls = backend.calls();
        assert!(calls.contains(&Call::GenBuffers(1)));
        assert!(calls.contains(&Call::BufferData {
            buffer: 2,
            format: AL_FORMAT_MONO16,
            len: 100,
            frequency: 22050,
        }));
        assert!(calls.contains(&Call::QueueBuffers(1, vec![2])));
        assert_eq!(backend.queued_buffers(1), vec![2]);
        assert!(!sink.source(id).unwrap().has_pending());
    }

    #[test]
    fn test_unsupported_data_does_not_block_update() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let a = sink.add_source(SoundSource::new());
        let b = sink.add_source(SoundSource::new());

        let err = sink
            .source_mut(a)
            .unwrap()
            .queue(SoundData::new(vec![0; 12], 3, 16, 44100))
            .unwrap_err();
        assert!(matches!(
            err,
            OpenAlError::UnsupportedFormat {
                channels: 3,
                bits: 16
            }
        ));
        sink.source_mut(b).unwrap().set_gain(0.5);

        for _ in 0..2 {
            sink.update().unwrap();
        }
        assert!(!sink.source(a).unwrap().has_pending());
        assert!(!sink.source(b).unwrap().changed());
        assert!(backend.calls().contains(&Call::SourceF(2, AL_GAIN, 0.5)));
        assert!(!backend.calls().contains(&Call::GenBuffers(1)));
        assert_eq!(backend.calls().last(), Some(&Call::Process));
    }

    #[test]
    fn test_allocation_refusal_is_resource_exhausted() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let id = sink.add_source(SoundSource::new());
        backend.refuse_allocation(Some(AL_OUT_OF_MEMORY));

        let err = sink.update().unwrap_err();
        assert!(matches!(err, OpenAlError::ResourceExhausted { .. }));
        assert!(sink.source(id).unwrap().changed());
        assert_eq!(sink.handle_of(id), None);
    }

    #[test]
    fn test_play_all_is_one_call() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let a = sink.add_source(SoundSource::new());
        let b = sink.add_source(SoundSource::new());
        sink.play_all(&[a, b]).unwrap();

        let commands: Vec<Call> = backend
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Play(_)))
            .collect();
        assert_eq!(commands, vec![Call::Play(vec![1, 2])]);

        backend.clear_calls();
        sink.stop_all(&[]).unwrap();
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_command_on_unknown_source() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let err = sink.pause(SourceId(3)).unwrap_err();
        assert!(matches!(err, OpenAlError::UnassociatedEntity(SourceId(3))));
    }

    #[test]
    fn test_removed_handle_reused_after_stop() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let a = sink.add_source(SoundSource::new());
        sink.play(a).unwrap();

        let mut removed = sink.remove_source(a).unwrap();
        assert!(removed.properties().is_dirty(Property::Gain));
        removed.set_gain(0.25);

        // Handle 1 is still playing, so a new native source is generated.
        let b = sink.add_source(SoundSource::new());
        sink.update().unwrap();
        assert_eq!(sink.handle_of(b).map(SourceHandle::raw), Some(2));

        backend.source_stop_v(&[1]);
        backend.clear_calls();
        let c = sink.add_source(removed);
        sink.update().unwrap();

        assert_eq!(sink.handle_of(c).map(SourceHandle::raw), Some(1));
        let calls = backend.calls();
        assert!(!calls.contains(&Call::GenSources(1)));
        assert_eq!(calls[0], Call::SourceI(1, AL_BUFFER, 0));
        assert!(calls.contains(&Call::SourceF(1, AL_GAIN, 0.25)));
    }

    #[test]
    fn test_recycled_handle_forgets_previous_settings() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let a = sink.add_source(SoundSource::new());
        sink.source_mut(a)
            .unwrap()
            .set_looping(true)
            .set_rolloff_factor(9.0);
        sink.play(a).unwrap();
        assert!(sink.remove_source(a).is_some());
        backend.source_stop_v(&[1]);
        backend.clear_calls();

        let b = sink.add_source(SoundSource::new());
        sink.update().unwrap();
        assert_eq!(sink.handle_of(b).map(SourceHandle::raw), Some(1));

        let calls = backend.setter_calls();
        assert!(calls.contains(&Call::SourceI(1, AL_LOOPING, 0)));
        assert!(calls.contains(&Call::SourceF(1, AL_ROLLOFF_FACTOR, 1.0)));
        assert!(calls.contains(&Call::SourceF(1, AL_GAIN, 1.0)));

        sink.refresh(b).unwrap();
        let source = sink.source(b).unwrap();
        assert_eq!(source.looping(), Some(false));
        assert_eq!(source.rolloff_factor(), Some(1.0));
    }

    #[test]
    fn test_destroy_source_deletes_native_objects() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let id = sink.add_source(SoundSource::new());
        sink.source_mut(id).unwrap().queue(mono(64)).unwrap();
        sink.update().unwrap();
        backend.clear_calls();

        sink.destroy_source(id).unwrap();
        assert_eq!(
            backend.calls(),
            vec![
                Call::Stop(vec![1]),
                Call::DeleteSources(vec![1]),
                Call::DeleteBuffers(vec![2]),
            ]
        );
        assert!(!sink.contains_source(id));

        let err = sink.destroy_source(id).unwrap_err();
        assert!(matches!(err, OpenAlError::UnassociatedEntity(_)));
    }

    #[test]
    fn test_unqueue_processed_deletes_finished_buffers() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        let id = sink.add_source(SoundSource::new());
        {
            let source = sink.source_mut(id).unwrap();
            source.queue(mono(32)).unwrap();
            source.queue(mono(32)).unwrap();
        }
        sink.update().unwrap();
        assert_eq!(backend.queued_buffers(1), vec![2, 3]);

        assert_eq!(sink.unqueue_processed(id).unwrap(), 0);

        backend.set_source_int(1, AL_BUFFERS_PROCESSED, 1);
        backend.clear_calls();
        assert_eq!(sink.unqueue_processed(id).unwrap(), 1);
        assert_eq!(
            backend.calls(),
            vec![Call::UnqueueBuffers(1, 1), Call::DeleteBuffers(vec![2])]
        );
        assert_eq!(backend.queued_buffers(1), vec![3]);
    }

    #[test]
    fn test_drop_releases_everything() {
        let backend = MockBackend::new();
        {
            let mut sink = sink(&backend);
            let a = sink.add_source(SoundSource::new());
            sink.source_mut(a).unwrap().queue(mono(16)).unwrap();
            sink.update().unwrap();
            backend.clear_calls();
        }
        assert_eq!(
            backend.calls(),
            vec![
                Call::MakeCurrent,
                Call::Stop(vec![1]),
                Call::DeleteSources(vec![1]),
                Call::DeleteBuffers(vec![2]),
            ]
        );
    }

    #[test]
    fn test_set_listener_redelivers_values() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        sink.listener_mut().set_position(Vec3::new(1.0, 0.0, 0.0));
        sink.update().unwrap();

        let listener = sink.take_listener().unwrap();
        assert!(!listener.changed());
        sink.set_listener(listener);
        assert!(sink.listener().unwrap().changed());

        backend.clear_calls();
        sink.update().unwrap();
        assert!(
            backend
                .calls()
                .contains(&Call::ListenerFv(AL_POSITION, vec![1.0, 0.0, 0.0]))
        );
    }

    #[test]
    fn test_refresh_listener() {
        let backend = MockBackend::new();
        let mut sink = sink(&backend);
        sink.listener_mut().set_gain(0.75);
        sink.update().unwrap();
        sink.refresh_listener().unwrap();
        assert_eq!(sink.listener().unwrap().gain(), Some(0.75));
    }
}
