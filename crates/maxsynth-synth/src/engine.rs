//! Polyphonic voice pool.
//!
//! [`SynthEngine`] owns a fixed set of voices, dispatches note events to
//! them, broadcasts per-block parameters and mixes their output.
//!
//! ## Voice allocation
//!
//! A note-on picks, among voices whose [`Voice::can_play_note`] accepts
//! the note:
//!
//! 1. the idle voice that has been idle longest,
//! 2. else the releasing voice triggered earliest,
//! 3. else the voice triggered earliest.
//!
//! Ties go to the lowest pool index. A stolen voice is hard-stopped before
//! the new note starts. If no voice accepts the note it is skipped.

use alloc::vec;
use alloc::vec::Vec;

use maxsynth_core::{Lfo, soft_limit};

use crate::event::{NoteEvent, NoteEventKind};
use crate::params::ParamSnapshot;
use crate::voice::{DEFAULT_MAX_BLOCK_SIZE, SubtractiveVoice, Voice, VoiceState};

/// Voice count used by hosts that do not choose one.
pub const DEFAULT_VOICE_COUNT: usize = 10;

/// Sample rate assumed until `prepare` is called.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

#[derive(Debug, Clone)]
struct VoiceSlot<V> {
    voice: V,
    /// Clock value when the current or last note started
    triggered_at: u64,
    /// Clock value when the voice last became idle
    idle_since: u64,
}

/// Fixed-size polyphonic voice pool.
///
/// All storage is sized in [`prepare`](Self::prepare); [`render`](Self::render)
/// never allocates. Host blocks longer than the prepared maximum are
/// rendered in sub-blocks.
///
/// # Example
///
/// ```rust
/// use maxsynth_synth::{NoteEvent, ParamSnapshot, SynthEngine};
///
/// let mut engine = SynthEngine::new(4);
/// engine.prepare(48000.0, 256, 2);
/// engine.apply_parameters(&ParamSnapshot::default());
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// engine.render(
///     &mut [&mut left[..], &mut right[..]],
///     &[NoteEvent::note_on(60, 1.0), NoteEvent::note_on(64, 1.0)],
/// );
///
/// assert_eq!(engine.active_voice_count(), 2);
/// assert!(left.iter().all(|s| (-1.0..=1.0).contains(s)));
/// ```
#[derive(Debug, Clone)]
pub struct SynthEngine<V: Voice = SubtractiveVoice> {
    slots: Vec<VoiceSlot<V>>,
    /// Shared modulation source, free-running across notes
    lfo: Lfo,
    lfo_buffer: Vec<f32>,
    sample_rate: f32,
    max_block_size: usize,
    channels: usize,
    /// Monotonic counter stamping note starts and voice releases
    clock: u64,
    /// Last snapshot pushed to the voices
    applied: Option<ParamSnapshot>,
}

impl SynthEngine<SubtractiveVoice> {
    /// Create a pool of `voice_count` subtractive voices, prepared for
    /// 48 kHz stereo with 512-frame blocks.
    pub fn new(voice_count: usize) -> Self {
        Self::from_voices((0..voice_count).map(|_| SubtractiveVoice::new(DEFAULT_SAMPLE_RATE)))
    }
}

impl Default for SynthEngine<SubtractiveVoice> {
    fn default() -> Self {
        Self::new(DEFAULT_VOICE_COUNT)
    }
}

impl<V: Voice> SynthEngine<V> {
    /// Create a pool from prebuilt voices.
    pub fn from_voices(voices: impl IntoIterator<Item = V>) -> Self {
        let mut engine = Self {
            slots: Vec::new(),
            lfo: Lfo::new(DEFAULT_SAMPLE_RATE, 2.0),
            lfo_buffer: vec![0.0; DEFAULT_MAX_BLOCK_SIZE],
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            channels: 2,
            clock: 0,
            applied: None,
        };
        for voice in voices {
            engine.add_voice(voice);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(voices = engine.slots.len(), "synth engine created");

        engine
    }

    /// Add a voice to the pool. Not for the render thread: the pool may
    /// grow. The voice is prepared with the engine's current settings.
    pub fn add_voice(&mut self, mut voice: V) {
        voice.prepare(self.sample_rate, self.max_block_size);
        if let Some(params) = &self.applied {
            voice.update_parameters(params);
        }
        self.slots.push(VoiceSlot {
            voice,
            triggered_at: 0,
            idle_since: 0,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!(index = self.slots.len() - 1, "voice added");
    }

    /// Configure for playback. Stops every voice.
    ///
    /// A non-finite or non-positive `sample_rate` keeps the previous rate.
    /// `max_block_size` is raised to at least 1.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize, channels: usize) {
        if sample_rate.is_finite() && sample_rate > 0.0 {
            self.sample_rate = sample_rate as f32;
        }
        self.max_block_size = max_block_size.max(1);
        self.channels = channels;

        self.lfo.set_sample_rate(self.sample_rate);
        self.lfo_buffer.clear();
        self.lfo_buffer.resize(self.max_block_size, 0.0);
        for slot in &mut self.slots {
            slot.voice.prepare(self.sample_rate, self.max_block_size);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = self.sample_rate,
            max_block_size = self.max_block_size,
            channels,
            voices = self.slots.len(),
            "synth engine prepared"
        );
    }

    /// Push a parameter snapshot to the LFO and every voice.
    ///
    /// Repeating the previous snapshot is a no-op.
    pub fn apply_parameters(&mut self, params: &ParamSnapshot) {
        if self.applied.as_ref() == Some(params) {
            return;
        }
        self.lfo.set_frequency(params.lfo_freq);
        self.lfo.set_waveform(params.lfo_waveform);
        for slot in &mut self.slots {
            slot.voice.update_parameters(params);
        }
        self.applied = Some(*params);
    }

    /// Apply one note event immediately.
    pub fn handle_event(&mut self, event: &NoteEvent) {
        match event.kind {
            NoteEventKind::NoteOn => self.note_on(event.note, event.velocity),
            NoteEventKind::NoteOff => self.note_off(event.note),
            NoteEventKind::AllNotesOff { allow_tail_off } => self.all_notes_off(allow_tail_off),
        }
    }

    /// Start `note`. Velocity 0 (or NaN) releases it instead.
    ///
    /// A voice already holding the same note is released first, so a
    /// repeated note-on retriggers on a fresh voice.
    pub fn note_on(&mut self, note: u8, velocity: f32) {
        let note = note.min(127);
        let velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };
        if velocity == 0.0 {
            self.note_off(note);
            return;
        }

        self.release_matching(
            |voice| voice.state() == VoiceState::Active && voice.note() == Some(note),
            true,
        );

        let Some(index) = self.find_voice(note) else {
            return;
        };

        self.clock += 1;
        let slot = &mut self.slots[index];
        if slot.voice.is_active() {
            slot.voice.stop_note(0.0, false);
        }
        slot.voice.start_note(note, velocity);
        slot.triggered_at = self.clock;
    }

    /// Release every held voice playing `note`.
    pub fn note_off(&mut self, note: u8) {
        let note = note.min(127);
        self.release_matching(
            |voice| voice.state() == VoiceState::Active && voice.note() == Some(note),
            true,
        );
    }

    /// Stop every sounding voice. Without tail-off they fall silent at once.
    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        self.release_matching(V::is_active, allow_tail_off);
    }

    fn release_matching(&mut self, matches: impl Fn(&V) -> bool, allow_tail_off: bool) {
        for slot in &mut self.slots {
            if matches(&slot.voice) {
                slot.voice.stop_note(0.0, allow_tail_off);
                if !slot.voice.is_active() {
                    self.clock += 1;
                    slot.idle_since = self.clock;
                }
            }
        }
    }

    fn find_voice(&self, note: u8) -> Option<usize> {
        let candidates = || {
            self.slots
                .iter()
                .enumerate()
                .filter(move |(_, slot)| slot.voice.can_play_note(note))
        };

        candidates()
            .filter(|(_, slot)| !slot.voice.is_active())
            .min_by_key(|(i, slot)| (slot.idle_since, *i))
            .or_else(|| {
                candidates()
                    .filter(|(_, slot)| slot.voice.state() == VoiceState::Releasing)
                    .min_by_key(|(i, slot)| (slot.triggered_at, *i))
            })
            .or_else(|| candidates().min_by_key(|(i, slot)| (slot.triggered_at, *i)))
            .map(|(i, _)| i)
    }

    /// Render one host block.
    ///
    /// Clears `output`, applies `events` in order, then mixes every active
    /// voice and passes the result through the soft limiter. Every channel
    /// receives the same mono mix; the block length is the shortest
    /// channel.
    pub fn render(&mut self, output: &mut [&mut [f32]], events: &[NoteEvent]) {
        debug_assert!(
            events
                .windows(2)
                .all(|pair| pair[0].sample_offset <= pair[1].sample_offset),
            "note events must be sorted by sample offset"
        );

        for channel in output.iter_mut() {
            channel.fill(0.0);
        }
        for event in events {
            self.handle_event(event);
        }

        let frames = output.iter().map(|c| c.len()).min().unwrap_or(0);
        let mut start = 0;
        while start < frames {
            let len = (frames - start).min(self.max_block_size);
            let lfo = &mut self.lfo_buffer[..len];
            self.lfo.render(lfo);

            for slot in &mut self.slots {
                if !slot.voice.is_active() {
                    continue;
                }
                slot.voice.render(output, start, len, &self.lfo_buffer[..len]);
                if !slot.voice.is_active() {
                    self.clock += 1;
                    slot.idle_since = self.clock;
                }
            }
            start += len;
        }

        for channel in output.iter_mut() {
            for sample in channel.iter_mut() {
                *sample = soft_limit(*sample);
            }
        }
    }

    /// Voices currently playing or releasing.
    pub fn active_voice_count(&self) -> usize {
        self.slots.iter().filter(|s| s.voice.is_active()).count()
    }

    /// Pool size.
    pub fn voice_count(&self) -> usize {
        self.slots.len()
    }

    /// The voices, in pool order.
    pub fn voices(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().map(|s| &s.voice)
    }

    /// Current sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Largest sub-block rendered in one pass.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Channel count from the last `prepare`.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The shared LFO.
    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}
