use chrono::{DateTime, Local};

use super::executor::{execute, Navigator};
use super::parser::parse;
use super::speech::{Recognizer, SpeechEvent, Synthesizer};
use crate::error::Result;
use crate::storage::{AppState, Repository};

lazy_re!(STOP_PHRASE, r"(?i)^\s*(?:stop|quit|exit)\s+listening\W*$|^\s*(?:goodbye|quit|exit)\W*$");

const STOPPED: &str = "Stopped listening.";

/// Wires recognizer, parser, executor and synthesizer over a loaded state.
pub struct VoiceAgent {
    repo: Repository,
    state: AppState,
    navigator: Option<Box<dyn Navigator>>,
}

impl VoiceAgent {
    pub fn new(repo: Repository, state: AppState) -> Self {
        VoiceAgent {
            repo,
            state,
            navigator: None,
        }
    }

    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Executes one utterance and persists whatever it changed.
    pub fn handle(&mut self, utterance: &str, now: DateTime<Local>) -> Result<String> {
        let command = parse(utterance, now.date_naive());
        log::debug!(
            "voice command {:?}/{:?} from {:?}",
            command.action(),
            command.entity(),
            utterance
        );
        let navigator = self.navigator.as_mut().map(|n| n.as_mut() as &mut dyn Navigator);
        let reply = execute(&command, &mut self.state, navigator, now);
        if self.state.is_dirty() {
            self.state.save_dirty(&mut self.repo)?;
        }
        Ok(reply)
    }

    /// Listens until the recognizer runs dry or a stop phrase is heard.
    ///
    /// Returns the number of utterances executed.
    pub fn run(&mut self, recognizer: &mut dyn Recognizer, synthesizer: &mut dyn Synthesizer) -> Result<usize> {
        let mut handled = 0;
        recognizer.start_listening();
        while let Some(transcript) = recognizer.next_transcript()? {
            if STOP_PHRASE.is_match(&transcript) {
                recognizer.stop_listening();
                speak(synthesizer, STOPPED);
                break;
            }
            let reply = self.handle(&transcript, Local::now())?;
            speak(synthesizer, &reply);
            handled += 1;
        }
        Ok(handled)
    }
}

fn speak(synthesizer: &mut dyn Synthesizer, text: &str) {
    synthesizer.speak(text, &mut |event| {
        if let SpeechEvent::Error(e) = event {
            log::warn!("speech synthesis failed: {}", e);
        }
    });
}
