/*!
    PCM extraction and sample conversion.
*/

use ffmpeg_next::util::frame::audio::Audio as AudioFrameFFmpeg;

use ffmpeg_types::{Error, Result, SampleFormat};

/**
    Interleaved bytes of the first `samples` frames of `frame`.

    Planar frames are read through `extended_data`, which has one pointer
    per channel even past the eight inline `data` slots. Every plane is as
    long as plane 0, but `linesize` is only reliable for the first one.
*/
pub(crate) fn copy_audio_data(
    frame: &AudioFrameFFmpeg,
    format: SampleFormat,
    samples: usize,
    channels: u16,
) -> Result<Vec<u8>> {
    let bytes_per_sample = format.bytes_per_sample();
    let total_bytes = samples * channels as usize * bytes_per_sample;
    let expected_plane_bytes = samples * bytes_per_sample;

    if frame.is_planar() && frame.planes() >= channels as usize {
        let plane_size = frame.data(0).len();
        if plane_size < expected_plane_bytes {
            return Err(Error::invalid_data(format!(
                "audio plane size {} is less than expected {} bytes for {} samples",
                plane_size, expected_plane_bytes, samples
            )));
        }

        let mut planes = Vec::with_capacity(channels as usize);
        for ch in 0..channels as usize {
            // SAFETY: a planar frame with `planes() >= channels` holds at
            // least `channels` valid plane pointers, each `plane_size` long.
            let plane = unsafe {
                let ptr = *(*frame.as_ptr()).extended_data.add(ch);
                if ptr.is_null() {
                    return Err(Error::invalid_data(format!("audio plane {} is missing", ch)));
                }
                std::slice::from_raw_parts(ptr as *const u8, plane_size)
            };
            planes.push(plane);
        }

        Ok(interleave_planes(&planes, samples, bytes_per_sample))
    } else {
        let plane0_data = frame.data(0);
        if plane0_data.len() < total_bytes {
            return Err(Error::invalid_data(format!(
                "packed audio data has {} bytes, expected at least {}",
                plane0_data.len(),
                total_bytes
            )));
        }
        Ok(plane0_data[..total_bytes].to_vec())
    }
}

/**
    Interleave `samples` values of `width` bytes from each plane, one plane
    per channel. Every plane must hold at least `samples * width` bytes.
*/
fn interleave_planes(planes: &[&[u8]], samples: usize, width: usize) -> Vec<u8> {
    let channels = planes.len();
    let mut output = vec![0u8; samples * channels * width];
    for (ch, plane) in planes.iter().enumerate() {
        for s in 0..samples {
            let src = s * width;
            let dst = (s * channels + ch) * width;
            output[dst..dst + width].copy_from_slice(&plane[src..src + width]);
        }
    }
    output
}

/**
    Convert interleaved native-endian samples of any supported format to
    signed 16-bit PCM, appending to `out`.

    Floating-point input is clamped to [-1.0, 1.0]; wider integer formats
    keep their most significant 16 bits.
*/
pub fn samples_to_i16(bytes: &[u8], format: SampleFormat, out: &mut Vec<i16>) {
    let width = format.bytes_per_sample();
    out.reserve(bytes.len() / width);

    let chunks = bytes.chunks_exact(width);
    match format {
        SampleFormat::U8 => out.extend(chunks.map(|c| ((c[0] as i16) - 128) << 8)),
        SampleFormat::S16 => out.extend(chunks.map(bytemuck::pod_read_unaligned::<i16>)),
        SampleFormat::S32 => out.extend(
            chunks.map(|c| (bytemuck::pod_read_unaligned::<i32>(c) >> 16) as i16),
        ),
        SampleFormat::F32 => out.extend(
            chunks.map(|c| float_to_i16(bytemuck::pod_read_unaligned::<f32>(c) as f64)),
        ),
        SampleFormat::F64 => {
            out.extend(chunks.map(|c| float_to_i16(bytemuck::pod_read_unaligned::<f64>(c))))
        }
    }
}

fn float_to_i16(value: f64) -> i16 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(-1.0, 1.0) * i16::MAX as f64).round() as i16
}
