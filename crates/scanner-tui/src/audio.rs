//! Audio sink — raw 16-bit LE mono PCM from binary frames out to the speakers.
//!
//! Binary frames go through [`AudioSink::feed`] untouched and in arrival
//! order.  The cpal implementation queues decoded samples behind a mutex
//! shared with the device callback, which resamples to the device rate.
//! Playback waits for `prebuffer_ms` of audio before starting and again
//! after every underrun.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use scanner_proto::config::AudioConfig;
use tracing::{info, trace, warn};

/// Consumer of binary frames.  Receives each frame verbatim.
pub trait AudioSink {
    fn feed(&mut self, pcm: &[u8]);
}

/// Discards audio (muted, or no output device).
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn feed(&mut self, pcm: &[u8]) {
        trace!("discarding {} bytes of audio", pcm.len());
    }
}

/// What the header shows about audio output.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioStatus {
    Playing(String),
    Muted,
    Unavailable(String),
}

/// Decoded sample queue plus the playback cursor of the device callback.
#[derive(Debug)]
pub struct PcmQueue {
    samples: VecDeque<f32>,
    /// Low byte of a sample split across two frames.
    carry: Option<u8>,
    source_rate: u32,
    prebuffer: usize,
    max_len: usize,
    started: bool,
    /// Fractional read position between `samples[0]` and `samples[1]`.
    phase: f64,
    volume: f32,
}

impl PcmQueue {
    pub fn new(config: &AudioConfig) -> Self {
        let rate = config.sample_rate.max(1);
        let per_ms = |ms: u32| (rate as u64 * ms as u64 / 1000) as usize;
        Self {
            samples: VecDeque::new(),
            carry: None,
            source_rate: rate,
            prebuffer: per_ms(config.prebuffer_ms),
            max_len: per_ms(config.max_buffer_ms).max(2),
            started: false,
            phase: 0.0,
            volume: config.volume.clamp(0.0, 1.0),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append signed 16-bit little-endian samples.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        let mut rest = bytes;
        if let Some(lo) = self.carry.take() {
            match rest.split_first() {
                Some((&hi, tail)) => {
                    self.push_sample(i16::from_le_bytes([lo, hi]));
                    rest = tail;
                }
                None => {
                    self.carry = Some(lo);
                    return;
                }
            }
        }

        let mut chunks = rest.chunks_exact(2);
        for pair in &mut chunks {
            self.push_sample(i16::from_le_bytes([pair[0], pair[1]]));
        }
        if let [lo] = chunks.remainder() {
            self.carry = Some(*lo);
        }

        if self.samples.len() > self.max_len {
            let excess = self.samples.len() - self.max_len;
            self.samples.drain(..excess);
            self.phase = 0.0;
            trace!("audio queue over capacity, dropped {} samples", excess);
        }
    }

    fn push_sample(&mut self, sample: i16) {
        self.samples.push_back(sample as f32 / 32768.0);
    }

    /// Fill an interleaved output buffer of `channels` channels at
    /// `out_rate`, linearly interpolating from the source rate.  Writes
    /// silence while prebuffering or starved.
    pub fn fill(&mut self, out: &mut [f32], out_rate: u32, channels: usize) {
        let channels = channels.max(1);
        let step = self.source_rate as f64 / out_rate.max(1) as f64;

        for frame in out.chunks_mut(channels) {
            let value = self.next_sample(step);
            frame.fill(value * self.volume);
        }
    }

    fn next_sample(&mut self, step: f64) -> f32 {
        if !self.started {
            if self.samples.len() < self.prebuffer.max(2) {
                return 0.0;
            }
            self.started = true;
        }
        if self.samples.len() < 2 {
            self.started = false;
            return 0.0;
        }

        let s0 = self.samples[0];
        let s1 = self.samples[1];
        let value = s0 + (s1 - s0) * self.phase as f32;

        self.phase += step;
        while self.phase >= 1.0 && !self.samples.is_empty() {
            self.samples.pop_front();
            self.phase -= 1.0;
        }
        value
    }
}

/// Plays audio on the default cpal output device.
pub struct CpalSink {
    queue: Arc<Mutex<PcmQueue>>,
    // Dropping the stream stops playback.
    _stream: cpal::Stream,
}

impl CpalSink {
    pub fn open(config: &AudioConfig) -> anyhow::Result<(Self, String)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no default output device"))?;
        let device_name = device.name().unwrap_or_else(|_| "default".to_string());
        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();

        let queue = Arc::new(Mutex::new(PcmQueue::new(config)));
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, queue.clone())?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, queue.clone())?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, queue.clone())?,
            other => anyhow::bail!("unsupported output sample format {:?}", other),
        };
        stream.play()?;

        info!(
            "audio output on {} ({} Hz, {} ch, {:?}), source {} Hz",
            device_name,
            stream_config.sample_rate.0,
            stream_config.channels,
            sample_format,
            config.sample_rate
        );
        Ok((
            Self {
                queue,
                _stream: stream,
            },
            device_name,
        ))
    }
}

impl AudioSink for CpalSink {
    fn feed(&mut self, pcm: &[u8]) {
        match self.queue.lock() {
            Ok(mut queue) => queue.push_bytes(pcm),
            Err(_) => warn!("audio queue poisoned, dropping {} bytes", pcm.len()),
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    queue: Arc<Mutex<PcmQueue>>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let out_rate = config.sample_rate.0;
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0);
            match queue.lock() {
                Ok(mut q) => q.fill(&mut scratch, out_rate, channels),
                Err(_) => scratch.fill(0.0),
            }
            for (out, sample) in data.iter_mut().zip(&scratch) {
                *out = T::from_sample(*sample);
            }
        },
        |err| warn!("audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Pick the sink for this session.  Audio problems never stop the client;
/// they fall back to [`NullSink`].
pub fn open_sink(config: &AudioConfig, mute: bool) -> (Box<dyn AudioSink>, AudioStatus) {
    if mute || !config.enabled {
        info!("audio output disabled");
        return (Box::new(NullSink), AudioStatus::Muted);
    }
    match CpalSink::open(config) {
        Ok((sink, device)) => (Box::new(sink), AudioStatus::Playing(device)),
        Err(e) => {
            warn!("audio output unavailable: {}", e);
            (Box::new(NullSink), AudioStatus::Unavailable(e.to_string()))
        }
    }
}
