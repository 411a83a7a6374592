//! Offline render command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use maxsynth_config::{
    NoteSpec, RenderConfig, ScheduledEvent, load_render_config, parse_assignment,
};
use maxsynth_core::linear_to_db;
use maxsynth_io::{WavSpec, write_wav};
use maxsynth_synth::{NoteEvent, SynthParams, SynthProcessor, midi_to_freq};

const DEFAULT_CHORD: &[u8] = &[60, 64, 67];

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Render configuration (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// MIDI notes played together (comma-separated, e.g., "60,64,67").
    /// Replaces the notes in the config file.
    #[arg(long)]
    notes: Option<String>,

    /// Velocity for --notes (0-1)
    #[arg(long, default_value = "0.8")]
    velocity: f32,

    /// Held time for --notes in seconds
    #[arg(long, default_value = "1.0")]
    duration: f64,

    /// Seconds rendered after the last note-off
    #[arg(long)]
    tail: Option<f64>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Output channels
    #[arg(long)]
    channels: Option<usize>,

    /// Voice pool size
    #[arg(long)]
    voices: Option<usize>,

    /// Output bit depth (16, 24 or 32 float)
    #[arg(long)]
    bits: Option<u16>,

    /// Parameter assignment, e.g. --set osc1_waveform=saw --set filter_cutoff=2kHz
    #[arg(long = "set", value_name = "ID=VALUE")]
    set: Vec<String>,
}

fn parse_notes(notes: &str) -> anyhow::Result<Vec<u8>> {
    let parsed = notes
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .ok()
                .filter(|n| *n <= 127)
                .ok_or_else(|| anyhow::anyhow!("Invalid MIDI note '{s}' (expected 0-127)"))
        })
        .collect::<anyhow::Result<Vec<u8>>>()?;
    if parsed.is_empty() {
        anyhow::bail!("No MIDI notes provided. Use format: --notes \"60,64,67\"");
    }
    Ok(parsed)
}

fn build_config(args: &RenderArgs) -> anyhow::Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => load_render_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RenderConfig::default(),
    };

    if let Some(sample_rate) = args.sample_rate {
        config.engine.sample_rate = sample_rate;
    }
    if let Some(channels) = args.channels {
        config.engine.channels = channels;
    }
    if let Some(voices) = args.voices {
        config.engine.voices = voices;
    }
    if let Some(bits) = args.bits {
        config.bits_per_sample = bits;
    }
    if let Some(tail) = args.tail {
        config.tail_seconds = tail;
    }

    let chord = match &args.notes {
        Some(notes) => Some(parse_notes(notes)?),
        None if config.notes.is_empty() => Some(DEFAULT_CHORD.to_vec()),
        None => None,
    };
    if let Some(chord) = chord {
        config.notes = chord
            .into_iter()
            .map(|note| NoteSpec::new(note, args.velocity, 0.0, args.duration))
            .collect();
    }

    config.validate().context("Invalid render settings")?;
    Ok(config)
}

/// Render the schedule into planar channel buffers.
///
/// Blocks are split at event frames so every event lands on its exact
/// frame, since the engine applies events at block start.
pub fn render_offline(
    processor: &mut SynthProcessor,
    schedule: &[ScheduledEvent],
    total_frames: usize,
    block_size: usize,
) -> Vec<Vec<f32>> {
    let channels = processor.engine().channels();
    let block_size = block_size.max(1);
    let mut out = vec![vec![0.0f32; total_frames]; channels];
    let mut pending = schedule.iter().peekable();
    let mut events: Vec<NoteEvent> = Vec::new();
    let mut pos = 0usize;

    while pos < total_frames {
        events.clear();
        while let Some(scheduled) = pending.next_if(|e| e.frame as usize <= pos) {
            events.push(scheduled.event);
        }

        let mut end = (pos + block_size).min(total_frames);
        if let Some(next) = pending.peek() {
            end = end.min(next.frame as usize).max(pos + 1);
        }

        let mut slices: Vec<&mut [f32]> = out.iter_mut().map(|c| &mut c[pos..end]).collect();
        processor.render(&mut slices, &events);
        pos = end;
    }

    out
}

fn peak(channels: &[Vec<f32>]) -> f32 {
    channels
        .iter()
        .flat_map(|c| c.iter())
        .fold(0.0f32, |acc, s| acc.max(s.abs()))
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    let params = Arc::new(SynthParams::new());
    config.apply_params(&params)?;
    for assignment in &args.set {
        let (param, value) = parse_assignment(assignment)
            .with_context(|| format!("Invalid --set '{assignment}'"))?;
        params.set(param, value);
        tracing::debug!(param = param.id(), value, "parameter override");
    }

    let mut processor = config.engine.build_processor(Arc::clone(&params));
    let schedule = config.schedule();
    let total_frames = usize::try_from(config.total_frames()).context("Render too long")?;

    println!("Rendering {} note(s)...", config.notes.len());
    for note in &config.notes {
        println!(
            "  {:3} ({:8.2} Hz)  vel {:.2}  at {:.2}s for {:.2}s",
            note.note,
            midi_to_freq(note.note),
            note.velocity,
            note.start,
            note.duration
        );
    }

    let audio = render_offline(
        &mut processor,
        &schedule,
        total_frames,
        config.engine.max_block_size,
    );

    let spec = WavSpec {
        channels: u16::try_from(config.engine.channels).context("Too many channels")?,
        sample_rate: config.engine.sample_rate,
        bits_per_sample: config.bits_per_sample,
    };
    let planar: Vec<&[f32]> = audio.iter().map(Vec::as_slice).collect();
    write_wav(&args.output, &planar, spec)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let peak_level = peak(&audio);
    tracing::info!(frames = total_frames, peak = peak_level, "render complete");
    println!(
        "Wrote {} frames ({:.2}s, {} ch) to {}",
        total_frames,
        total_frames as f64 / f64::from(config.engine.sample_rate),
        config.engine.channels,
        args.output.display()
    );
    println!("  Peak: {:.1} dBFS", linear_to_db(peak_level));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maxsynth_config::EngineConfig;

    fn mono_processor(block: usize) -> SynthProcessor {
        let engine = EngineConfig {
            channels: 1,
            max_block_size: block,
            ..Default::default()
        };
        engine.build_processor(Arc::new(SynthParams::new()))
    }

    #[test]
    fn test_parse_notes() {
        assert_eq!(parse_notes("60,64, 67").unwrap(), vec![60, 64, 67]);
        assert_eq!(parse_notes("48,").unwrap(), vec![48]);
        assert!(parse_notes("").is_err());
        assert!(parse_notes("60,c4").is_err());
        assert!(parse_notes("128").is_err());
    }

    #[test]
    fn test_event_lands_on_exact_frame() {
        let mut processor = mono_processor(512);
        let schedule = [ScheduledEvent {
            frame: 300,
            event: NoteEvent::note_on(69, 1.0),
        }];

        let out = render_offline(&mut processor, &schedule, 1024, 512);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 1024);
        assert!(out[0][..300].iter().all(|&s| s == 0.0));
        assert!(out[0][300..400].iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_note_off_releases_to_silence() {
        let mut processor = mono_processor(256);
        let schedule = [
            ScheduledEvent {
                frame: 0,
                event: NoteEvent::note_on(60, 1.0),
            },
            ScheduledEvent {
                frame: 4800,
                event: NoteEvent::note_off(60),
            },
        ];

        // default release 0.3 s = 14400 frames
        let out = render_offline(&mut processor, &schedule, 4800 + 14400 + 1000, 256);
        assert!(out[0][..4800].iter().any(|s| s.abs() > 0.01));
        assert!(out[0][4800 + 14400 + 10..].iter().all(|&s| s == 0.0));
        assert_eq!(processor.engine().active_voice_count(), 0);
    }

    #[test]
    fn test_peak() {
        assert_eq!(peak(&[vec![0.1, -0.5], vec![0.3]]), 0.5);
        assert_eq!(peak(&[]), 0.0);
    }
}
