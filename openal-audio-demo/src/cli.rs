use anyhow::{Context, Result};
use openal_audio::native::OpenAlApi;
use openal_audio::{SinkConfig, SoundSink, SoundSource, Vec3, load_file};
use std::time::Duration;

pub fn list_devices() -> Result<()> {
    let api = OpenAlApi::load(None)?;
    log::info!("OpenAL loaded from {}", api.library_path().display());
    for name in api.device_names() {
        println!("{}", name);
    }
    Ok(())
}

/// Plays `path` on a looping source that passes the listener from right to
/// left, one unit per second.
pub fn play_moving_source(path: &str) -> Result<()> {
    let data = load_file(path).with_context(|| format!("Failed to load {}", path))?;
    log::info!(
        "Loaded {}: {} channel(s), {} Hz, {:.2}s",
        path,
        data.channels(),
        data.frequency(),
        data.duration().as_secs_f32()
    );

    let mut sink = SoundSink::open(SinkConfig::default())?;
    sink.activate()?;

    let mut source = SoundSource::new();
    source
        .set_position(Vec3::new(10.0, 0.0, 0.0))
        .set_looping(true);
    source.queue(data)?;

    let id = sink.add_source(source);
    sink.play(id)?;

    loop {
        let source = sink
            .source_mut(id)
            .context("Source disappeared from the sink")?;
        let position = source.position().unwrap_or(Vec3::ZERO);
        if position.x <= -10.0 {
            break;
        }
        source.set_position(position - Vec3::X);
        sink.update()?;
        log::info!("Playing at {:?}", position - Vec3::X);
        std::thread::sleep(Duration::from_secs(1));
    }

    sink.stop(id)?;
    log::info!("Done");
    Ok(())
}
