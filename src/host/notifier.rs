//! # Notifier
//!
//! Speech and audio output. The skill only ever names a dialog and hands over
//! its data; rendering belongs to the notifier.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Template notifier publishes speech events on the bus
//! - 1.0.0: Initial release with YAML templates and recording notifier

use anyhow::Result;
use log::{info, warn};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::bus::{EventBus, SkillEvent};

/// Named values substituted into a dialog template
pub type DialogData = BTreeMap<String, String>;

/// Build dialog data from key/value pairs
pub fn dialog_data<const N: usize>(pairs: [(&str, String); N]) -> DialogData {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Fire-and-forget speech/audio output
pub trait Notifier: Send + Sync {
    fn speak(&self, dialog: &str, data: &DialogData);

    fn play(&self, cue: &str);
}

/// Default English templates, one or more variants per dialog
const DEFAULT_TEMPLATES: &[(&str, &[&str])] = &[
    ("Reminding", &["Reminder: {reminder}", "Don't forget, {reminder}"]),
    ("ToCancelInstructions", &["Say cancel reminder to stop it repeating"]),
    ("ByTheWay", &["By the way, remember to {reminder}"]),
    ("SavingReminder", &["Ok, I'll remind you at {timedate}"]),
    ("SavingReminderTomorrow", &["Ok, I'll remind you tomorrow at {timedate}"]),
    ("SavingReminderDate", &["Ok, I'll remind you on {date} at {time}"]),
    ("NoDateTime", &["I couldn't work out when to remind you"]),
    ("ItIsNight", &["That will be in the middle of the night"]),
    ("AreYouSure", &["Are you sure?"]),
    ("Ok", &["Ok, I'll keep that in mind"]),
    ("ParticularTime", &["Is there a particular time you want to be reminded?"]),
    ("SpecifyTime", &["When should I remind you?"]),
    ("Fine", &["Fine, never mind then"]),
    ("AboutWhat", &["What should I remind you about?"]),
    ("NoRemindersForDate", &["You have no reminders {date}"]),
    ("ConfirmRemoveDay", &["Do you want me to remove all reminders {date}?"]),
    ("ReminderAtTime", &["{reminder} at {time}"]),
    ("NoUpcoming", &["You have no upcoming reminders"]),
    ("NextToday", &["Your next reminder is today at {time}, {reminder}"]),
    ("NextTomorrow", &["Your next reminder is tomorrow at {time}, {reminder}"]),
    ("NextOtherDate", &["Your next reminder is on {date} at {time}, {reminder}"]),
    ("ReminderCancelled", &["Ok, reminder cancelled"]),
    ("NoActive", &["There is no active reminder to cancel"]),
    ("RemindingInFifteen", &["Ok, I'll remind you again in fifteen minutes"]),
    ("ClearAll", &["Are you sure you want to remove all reminders?"]),
    ("ClearedAll", &["All reminders removed"]),
];

/// Replace `{key}` placeholders with values from `data`
pub fn render_template(template: &str, data: &DialogData) -> String {
    let mut rendered = template.to_string();
    for (key, value) in data {
        rendered = rendered.replace(&format!("{{{}}}", key), value);
    }
    rendered
}

type SpeechSink = Box<dyn Fn(&str) + Send + Sync>;

/// Renders dialogs from templates and hands the text to a sink
pub struct TemplateNotifier {
    templates: HashMap<String, Vec<String>>,
    sink: SpeechSink,
    bus: Option<(Arc<dyn EventBus>, String)>,
}

impl TemplateNotifier {
    /// Built-in English templates, printed to stdout
    pub fn new() -> Self {
        let templates = DEFAULT_TEMPLATES
            .iter()
            .map(|(name, variants)| {
                (
                    name.to_string(),
                    variants.iter().map(|v| v.to_string()).collect(),
                )
            })
            .collect();

        Self {
            templates,
            sink: Box::new(|text| println!("{}", text)),
            bus: None,
        }
    }

    /// Load templates from a YAML map of dialog name to variant list, over the defaults
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let overrides: HashMap<String, Vec<String>> = serde_yaml::from_str(&contents)?;
        let mut notifier = Self::new();
        for (name, variants) in overrides {
            if variants.is_empty() {
                return Err(anyhow::anyhow!("Dialog '{}' has no variants", name));
            }
            notifier.templates.insert(name, variants);
        }
        Ok(notifier)
    }

    pub fn with_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Publish `SpeechStarted` from `source` whenever something is spoken
    pub fn with_bus(mut self, bus: Arc<dyn EventBus>, source: impl Into<String>) -> Self {
        self.bus = Some((bus, source.into()));
        self
    }

    /// Render one variant of a dialog, or the dialog name when it has no template
    pub fn render(&self, dialog: &str, data: &DialogData) -> String {
        match self.templates.get(dialog) {
            Some(variants) if !variants.is_empty() => {
                let idx = rand::rng().random_range(0..variants.len());
                render_template(&variants[idx], data)
            }
            _ => {
                warn!("No template for dialog '{}'", dialog);
                dialog.to_string()
            }
        }
    }
}

impl Default for TemplateNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TemplateNotifier {
    fn speak(&self, dialog: &str, data: &DialogData) {
        let text = self.render(dialog, data);
        info!("Speaking [{}]: {}", dialog, text);
        if let Some((bus, source)) = &self.bus {
            bus.publish(SkillEvent::SpeechStarted {
                source: Some(source.clone()),
            });
        }
        (self.sink)(&text);
    }

    fn play(&self, cue: &str) {
        info!("Playing audio cue {}", cue);
        (self.sink)(&format!("*{}*", cue));
    }
}

/// One recorded notifier call
#[derive(Debug, Clone, PartialEq)]
pub enum Utterance {
    Speak { dialog: String, data: DialogData },
    Play { cue: String },
}

/// Notifier that remembers everything it was asked to say
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<Utterance>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Utterance> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Dialog names spoken so far, in order
    pub fn dialogs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|u| match u {
                Utterance::Speak { dialog, .. } => Some(dialog),
                Utterance::Play { .. } => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Notifier for RecordingNotifier {
    fn speak(&self, dialog: &str, data: &DialogData) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Utterance::Speak {
                dialog: dialog.to_string(),
                data: data.clone(),
            });
    }

    fn play(&self, cue: &str) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Utterance::Play {
                cue: cue.to_string(),
            });
    }
}
