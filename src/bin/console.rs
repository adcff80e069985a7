use anyhow::Result;
use async_trait::async_trait;
use dotenvy::dotenv;
use log::{error, info, warn};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use reminder_skill::bus::{BroadcastBus, EventBus, SkillEvent};
use reminder_skill::core::Config;
use reminder_skill::features::reminders::ReminderScheduler;
use reminder_skill::features::ReminderSkill;
use reminder_skill::host::{
    normalize, Clock, DialogData, JsonFileSettings, Notifier, Prompter, SimpleTimeExtractor,
    SystemClock, TemplateNotifier, TimeExtractor,
};
use reminder_skill::intents::{default_registry, Intent, IntentContext};

/// How long a follow-up question waits for an answer
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

type Lines = Arc<Mutex<mpsc::Receiver<String>>>;

/// Speaks the question, then waits for the next stdin line
struct ConsolePrompter {
    notifier: Arc<dyn Notifier>,
    lines: Lines,
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn get_response(&self, dialog: &str, data: &DialogData) -> Option<String> {
        self.notifier.speak(dialog, data);
        let mut lines = self.lines.lock().await;
        match tokio::time::timeout(RESPONSE_TIMEOUT, lines.recv()).await {
            Ok(Some(line)) if !line.trim().is_empty() => Some(line),
            Ok(_) => None,
            Err(_) => {
                info!("No answer within {:?}", RESPONSE_TIMEOUT);
                None
            }
        }
    }
}

/// Keyword stand-in for the host's intent classifier
struct KeywordRouter {
    extractor: Arc<dyn TimeExtractor>,
    clock: Arc<dyn Clock>,
    lang: String,
    rules: Vec<(Regex, &'static str)>,
}

impl KeywordRouter {
    fn new(extractor: Arc<dyn TimeExtractor>, clock: Arc<dyn Clock>, lang: &str) -> Result<Self> {
        let rules = vec![
            (Regex::new(r"^(?:cancel|stop)(?: the)? reminders?$")?, "CancelActiveReminder"),
            (Regex::new(r"^snooze")?, "SnoozeReminder"),
            (Regex::new(r"^clear (?:all )?(?:of )?(?:my )?reminders$")?, "ClearReminders"),
            (
                Regex::new(r"^(?:delete|remove) (?:all )?(?:my )?reminders(?: (?:for|on) (?P<date>.+))?$")?,
                "DeleteReminderForDay",
            ),
            (Regex::new(r"next reminder")?, "GetNextReminders"),
            (
                Regex::new(r"^(?:what are )?(?:my )?reminders(?: (?:for|on) (?P<date>.+))?$")?,
                "GetRemindersForDay",
            ),
            (Regex::new(r"^remind me (?:of |about )?something$")?, "SomethingReminder"),
            (
                Regex::new(r"^(?:set a )?remind(?:er)?(?: me)? (?P<timedate>(?:at|in|on|tomorrow|tonight|today)\b.*)$")?,
                "UnspecifiedReminderAt",
            ),
            (Regex::new(r"^remind me (?:to |about )?(?P<reminder>.+)$")?, "Reminder"),
        ];

        Ok(Self {
            extractor,
            clock,
            lang: lang.to_string(),
            rules,
        })
    }

    fn route(&self, utterance: &str) -> Option<Intent> {
        let text = normalize(utterance);
        let (caps, name) = self
            .rules
            .iter()
            .find_map(|(re, name)| re.captures(&text).map(|caps| (caps, *name)))?;

        let mut intent = Intent::new(name, utterance);
        for slot in ["date", "timedate"] {
            if let Some(m) = caps.name(slot) {
                intent = intent.with_slot(slot, m.as_str());
            }
        }

        if let Some(reminder) = caps.name("reminder") {
            let reminder = reminder.as_str();
            match self.extractor.extract(reminder, self.clock.now(), &self.lang) {
                Some(found) if found.leftover != normalize(reminder) && !found.leftover.is_empty() => {
                    intent.name = "ReminderAt".to_string();
                    intent = intent.with_slot("reminder", found.leftover);
                }
                _ => intent = intent.with_slot("reminder", reminder),
            }
        }
        Some(intent)
    }
}

fn print_pending(scheduler: &ReminderScheduler) {
    match scheduler.pending() {
        Ok(pending) if pending.is_empty() => println!("(no pending reminders)"),
        Ok(pending) => {
            for r in pending {
                println!("- {} at {} (repeat {})", r.text, r.due_at, r.repeat_count);
            }
        }
        Err(e) => error!("Failed to read reminders: {}", e),
    }
    match scheduler.list_unspecified() {
        Ok(unspecified) => {
            for text in unspecified {
                println!("- {} (no time)", text);
            }
        }
        Err(e) => error!("Failed to read unspecified reminders: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder console...");

    let skill_config = config.skill_config()?;
    let skill_name = skill_config.skill_name.clone();

    let bus: Arc<dyn EventBus> = Arc::new(BroadcastBus::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = Arc::new(JsonFileSettings::new(&config.settings_path));
    info!("Persisting reminders to {}", config.settings_path.display());

    let templates = match &config.dialog_path {
        Some(path) => {
            info!("Loading dialog templates from {}", path);
            TemplateNotifier::load(path)?
        }
        None => TemplateNotifier::new(),
    };
    let notifier: Arc<dyn Notifier> =
        Arc::new(templates.with_bus(Arc::clone(&bus), skill_name.clone()));

    let extractor: Arc<dyn TimeExtractor> =
        Arc::new(SimpleTimeExtractor::new(skill_config.default_hour)?);
    let router = KeywordRouter::new(Arc::clone(&extractor), Arc::clone(&clock), &skill_config.lang)?;

    let scheduler = Arc::new(ReminderScheduler::new(settings, clock.clone(), skill_config)?);
    let skill = Arc::new(ReminderSkill::new(
        Arc::clone(&scheduler),
        Arc::clone(&notifier),
        clock,
    ));
    skill.initialize(bus.as_ref());

    let (tx, rx) = mpsc::channel(16);
    let lines: Lines = Arc::new(Mutex::new(rx));
    tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = stdin.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });

    let prompter = Arc::new(ConsolePrompter {
        notifier: Arc::clone(&notifier),
        lines: Arc::clone(&lines),
    });
    let ctx = Arc::new(
        IntentContext::new(Arc::clone(&scheduler), notifier, prompter, extractor)
            .with_bus(Arc::clone(&bus)),
    );
    let registry = default_registry();

    println!("Say something (\"list\" shows reminders, \"quit\" exits).");
    loop {
        // Release the receiver before dispatching so prompts can read answers
        let line = { lines.lock().await.recv().await };
        let Some(line) = line else { break };

        match normalize(&line).as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "list" => print_pending(&scheduler),
            "stop" => match skill.stop() {
                Ok(true) => {}
                Ok(false) => println!("(nothing to stop)"),
                Err(e) => error!("Stop failed: {}", e),
            },
            _ => match router.route(&line) {
                Some(intent) => {
                    registry.dispatch(Arc::clone(&ctx), &intent).await;
                }
                None => {
                    warn!("No intent matched '{}'", line);
                    // Another skill answering still primes the by-the-way path
                    let source = Some("fallback".to_string());
                    bus.publish(SkillEvent::SpeechStarted {
                        source: source.clone(),
                    });
                    println!("Sorry, I can only help with reminders.");
                    bus.publish(SkillEvent::SpeechEnded { source });
                }
            },
        }
    }

    skill.shutdown().await;
    info!("Reminder console stopped");
    Ok(())
}
