//! Host-facing processor: parameter store plus engine.

use alloc::sync::Arc;

use crate::engine::SynthEngine;
use crate::event::NoteEvent;
use crate::params::SynthParams;
use crate::voice::{SubtractiveVoice, Voice};

/// Pulls a parameter snapshot from the shared store once per block and
/// renders the engine with it.
///
/// The control thread keeps its own `Arc<SynthParams>` clone and writes to
/// it at any time; nothing here locks.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use maxsynth_synth::{NoteEvent, ParamIndex, SynthParams, SynthProcessor};
///
/// let params = Arc::new(SynthParams::new());
/// let mut processor = SynthProcessor::new(Arc::clone(&params), 8);
/// processor.prepare(44100.0, 128, 1);
///
/// params.set(ParamIndex::FilterCutoff, 4000.0);
///
/// let mut mono = [0.0f32; 128];
/// processor.render(&mut [&mut mono[..]], &[NoteEvent::note_on(48, 0.9)]);
/// assert_eq!(processor.engine().active_voice_count(), 1);
/// ```
#[derive(Debug)]
pub struct SynthProcessor<V: Voice = SubtractiveVoice> {
    engine: SynthEngine<V>,
    params: Arc<SynthParams>,
}

impl SynthProcessor<SubtractiveVoice> {
    /// Processor with `voice_count` subtractive voices reading `params`.
    pub fn new(params: Arc<SynthParams>, voice_count: usize) -> Self {
        Self::with_engine(params, SynthEngine::new(voice_count))
    }
}

impl<V: Voice> SynthProcessor<V> {
    /// Processor around an existing engine.
    pub fn with_engine(params: Arc<SynthParams>, engine: SynthEngine<V>) -> Self {
        Self { engine, params }
    }

    /// See [`SynthEngine::prepare`].
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize, channels: usize) {
        self.engine.prepare(sample_rate, max_block_size, channels);
    }

    /// Snapshot the parameters, apply them, then render the block.
    pub fn render(&mut self, output: &mut [&mut [f32]], events: &[NoteEvent]) {
        let snapshot = self.params.snapshot();
        self.engine.apply_parameters(&snapshot);
        self.engine.render(output, events);
    }

    /// The shared parameter store.
    pub fn params(&self) -> &Arc<SynthParams> {
        &self.params
    }

    /// The engine.
    pub fn engine(&self) -> &SynthEngine<V> {
        &self.engine
    }
}
