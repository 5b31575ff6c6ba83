//! Voice command pipeline: utterance -> [`parser`] -> [`resolver`] ->
//! [`executor`] -> spoken reply, driven by [`agent::VoiceAgent`].

macro_rules! lazy_re {
    ($name:ident, $pattern:expr) => {
        static $name: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
            regex::Regex::new($pattern).expect(concat!(stringify!($name), " should compile - this is a bug"))
        });
    };
}

pub mod agent;
pub mod executor;
pub mod extract;
pub mod parser;
pub mod resolver;
pub mod speech;

pub use agent::VoiceAgent;
pub use executor::{
    execute, ActionContext, HabitMutator, Navigator, RecordingNavigator, TaskMutator, TemplateSource, TodoMutator,
};
pub use parser::{parse, Action, Collection, Command, Entity, HabitDraft, Tab, TaskDraft};
pub use resolver::{resolve, resolve_index, resolve_ref, MatchTier};
pub use speech::{ConsoleSynthesizer, LineRecognizer, ListenMode, Recognizer, SpeechEvent, Synthesizer};
