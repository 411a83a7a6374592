//! Note events delivered to the engine alongside each block.

/// What a [`NoteEvent`] asks the engine to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteEventKind {
    /// Start a note. Velocity 0 is treated as a note-off.
    NoteOn,
    /// Release every voice holding the note.
    NoteOff,
    /// Stop every sounding voice, with or without release tails.
    AllNotesOff {
        /// Let voices ring out through their release stage.
        allow_tail_off: bool,
    },
}

/// A timestamped note event.
///
/// `sample_offset` is the frame within the block the event belongs to.
/// The engine applies events at the start of the block, in order; the
/// offset only defines that order.
///
/// # Example
///
/// ```rust
/// use maxsynth_synth::{NoteEvent, NoteEventKind};
///
/// let events = [
///     NoteEvent::note_on(60, 0.8),
///     NoteEvent::note_off(64).at(128),
/// ];
/// assert_eq!(events[1].kind, NoteEventKind::NoteOff);
/// assert_eq!(events[1].sample_offset, 128);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteEvent {
    /// Event type.
    pub kind: NoteEventKind,
    /// MIDI note number, 0 to 127.
    pub note: u8,
    /// Velocity, 0.0 to 1.0.
    pub velocity: f32,
    /// Frame offset within the block.
    pub sample_offset: u32,
}

impl NoteEvent {
    /// Note-on at offset 0.
    pub const fn note_on(note: u8, velocity: f32) -> Self {
        Self {
            kind: NoteEventKind::NoteOn,
            note,
            velocity,
            sample_offset: 0,
        }
    }

    /// Note-off at offset 0.
    pub const fn note_off(note: u8) -> Self {
        Self {
            kind: NoteEventKind::NoteOff,
            note,
            velocity: 0.0,
            sample_offset: 0,
        }
    }

    /// All-notes-off at offset 0.
    pub const fn all_notes_off(allow_tail_off: bool) -> Self {
        Self {
            kind: NoteEventKind::AllNotesOff { allow_tail_off },
            note: 0,
            velocity: 0.0,
            sample_offset: 0,
        }
    }

    /// Same event at `sample_offset`.
    #[must_use]
    pub const fn at(mut self, sample_offset: u32) -> Self {
        self.sample_offset = sample_offset;
        self
    }
}
