use crate::error::{OpenAlError, Result};
use crate::sound_data::SoundData;
use std::fs::File;
use std::path::Path;
use symphonia::{
    core::{
        audio::SampleBuffer,
        codecs::DecoderOptions,
        errors::Error,
        formats::FormatOptions,
        io::{MediaSource, MediaSourceStream},
        meta::MetadataOptions,
        probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Decodes an audio file into 16-bit PCM.
pub fn load_file(path: impl AsRef<Path>) -> Result<SoundData> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    log::debug!("Loading sound data from {}", path.display());
    load_reader(file, extension)
}

/// Decodes audio from any seekable source. `extension` is a format hint such
/// as `"wav"` or `"ogg"`.
pub fn load_reader<R: MediaSource + 'static>(
    reader: R,
    extension: Option<&str>,
) -> Result<SoundData> {
    let mss = MediaSourceStream::new(Box::new(reader), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| OpenAlError::AudioLoading(format!("Failed to probe audio format: {:?}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| OpenAlError::AudioLoading("No default audio track found".to_string()))?;
    let track_id = track.id;

    let frequency = track
        .codec_params
        .sample_rate
        .ok_or_else(|| OpenAlError::AudioLoading("Sample rate not found".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .ok_or_else(|| OpenAlError::AudioLoading("Channel count not found".to_string()))?
        .count() as u16;

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| OpenAlError::AudioLoading(format!("Failed to create decoder: {:?}", e)))?;

    let mut bytes: Vec<u8> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(Error::IoError(_)) => break, // end of stream
            Err(e) => {
                return Err(OpenAlError::AudioLoading(format!(
                    "Error reading packet: {:?}",
                    e
                )));
            }
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::IoError(_)) => break,
            Err(Error::DecodeError(_)) => continue, // recoverable corruption
            Err(e) => {
                return Err(OpenAlError::AudioLoading(format!(
                    "Error decoding packet: {:?}",
                    e
                )));
            }
        };

        let spec = *decoded.spec();
        let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
        samples.copy_interleaved_ref(decoded);
        bytes.extend(samples.samples().iter().flat_map(|s| s.to_le_bytes()));
    }

    log::debug!(
        "Decoded {} bytes: {} channel(s) at {} Hz",
        bytes.len(),
        channels,
        frequency
    );
    Ok(SoundData::new(bytes, channels, 16, frequency))
}
