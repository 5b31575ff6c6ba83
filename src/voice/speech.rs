//! Speech I/O seams. Console implementations stand in for platform
//! recognition and synthesis.

use std::io::{BufRead, Write};

use crate::error::{MomentumError, Result};

/// Lifecycle notifications from a [`Synthesizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Start,
    End,
    Error(String),
}

/// Listening mode of a [`Recognizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenMode {
    /// Stop after one transcript.
    Single,
    Continuous,
}

pub trait Recognizer {
    fn start_listening(&mut self);
    fn stop_listening(&mut self);
    fn is_listening(&self) -> bool;
    /// Blocks for the next transcript; `None` once listening has stopped or input ended.
    fn next_transcript(&mut self) -> Result<Option<String>>;
}

pub trait Synthesizer {
    fn speak(&mut self, text: &str, on_event: &mut dyn FnMut(SpeechEvent));
}

/// Reads one utterance per non-blank line.
pub struct LineRecognizer<R: BufRead> {
    input: R,
    mode: ListenMode,
    listening: bool,
}

impl<R: BufRead> LineRecognizer<R> {
    pub fn new(input: R, mode: ListenMode) -> Self {
        LineRecognizer {
            input,
            mode,
            listening: false,
        }
    }
}

impl<R: BufRead> Recognizer for LineRecognizer<R> {
    fn start_listening(&mut self) {
        self.listening = true;
    }

    fn stop_listening(&mut self) {
        self.listening = false;
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn next_transcript(&mut self) -> Result<Option<String>> {
        while self.listening {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                self.listening = false;
                return Ok(None);
            }
            let transcript = line.trim();
            if transcript.is_empty() {
                continue;
            }
            if self.mode == ListenMode::Single {
                self.listening = false;
            }
            return Ok(Some(transcript.to_string()));
        }
        Ok(None)
    }
}

/// "Speaks" by writing each sentence on its own line.
pub struct ConsoleSynthesizer<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSynthesizer<W> {
    pub fn new(out: W) -> Self {
        ConsoleSynthesizer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        self.out.flush().map_err(MomentumError::from)
    }
}

impl<W: Write> Synthesizer for ConsoleSynthesizer<W> {
    fn speak(&mut self, text: &str, on_event: &mut dyn FnMut(SpeechEvent)) {
        on_event(SpeechEvent::Start);
        match self.write_line(text) {
            Ok(()) => on_event(SpeechEvent::End),
            Err(e) => on_event(SpeechEvent::Error(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn single_mode_stops_after_one_transcript() {
        let mut rec = LineRecognizer::new(Cursor::new("\n  open notes \nhelp\n"), ListenMode::Single);
        assert_eq!(rec.next_transcript().unwrap(), None);
        rec.start_listening();
        assert_eq!(rec.next_transcript().unwrap().as_deref(), Some("open notes"));
        assert!(!rec.is_listening());
        assert_eq!(rec.next_transcript().unwrap(), None);
    }

    #[test]
    fn continuous_mode_reads_until_eof() {
        let mut rec = LineRecognizer::new(Cursor::new("a\nb\n"), ListenMode::Continuous);
        rec.start_listening();
        assert_eq!(rec.next_transcript().unwrap().as_deref(), Some("a"));
        assert_eq!(rec.next_transcript().unwrap().as_deref(), Some("b"));
        assert_eq!(rec.next_transcript().unwrap(), None);
        assert!(!rec.is_listening());
    }

    #[test]
    fn synthesizer_reports_start_and_end() {
        let mut synth = ConsoleSynthesizer::new(Vec::new());
        let mut events = Vec::new();
        synth.speak("Opening notes.", &mut |e| events.push(e));
        assert_eq!(events, vec![SpeechEvent::Start, SpeechEvent::End]);
        assert_eq!(String::from_utf8(synth.into_inner()).unwrap(), "Opening notes.\n");
    }
}
