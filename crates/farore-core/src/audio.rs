//! WAV encoding — in-memory sample buffers to WAV byte streams.
//!
//! Numeric-to-PCM conversion is delegated to hound; nothing here packs bits
//! by hand.

use std::io::Cursor;

fn mono_spec(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Encode floating-point amplitudes as a 16-bit mono PCM WAV byte stream.
///
/// Samples are clamped to [-1.0, 1.0] before quantization.
pub fn encode_wav_f32(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, mono_spec(sample_rate))?;
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(quantized)?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Wrap raw little-endian signed 16-bit PCM in a mono WAV container.
///
/// A trailing odd byte (truncated sample) is dropped.
pub fn encode_wav_pcm16(pcm: &[u8], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, mono_spec(sample_rate))?;
    for pair in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([pair[0], pair[1]]))?;
    }
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Format parameters decoded from a WAV byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Total samples across all channels.
    pub sample_count: u32,
}

/// Decode the header of a WAV byte stream.
pub fn wav_info(bytes: &[u8]) -> Result<WavInfo, hound::Error> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        sample_count: reader.len(),
    })
}
