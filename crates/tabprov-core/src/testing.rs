//! Test doubles for the bridge, operator and sleeper seams.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use crate::bridge::{BridgeCommand, DeviceBridge};
use crate::error::{ProvisionError, Result};
use crate::operator::Operator;
use crate::orchestrator::Sleeper;

/// One interleaved log of everything the doubles saw, shared between them so
/// tests can assert ordering across seams: `adb:<verb>`, `say:<msg>`,
/// `confirm:<prompt>`, `ask:<prompt>`, `sleep:<secs>`.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Index of the first entry equal to `entry`, at or after `from`.
    pub fn position_after(&self, from: usize, entry: &str) -> Option<usize> {
        self.0
            .borrow()
            .iter()
            .skip(from)
            .position(|e| e == entry)
            .map(|i| i + from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub selector: Option<String>,
    pub verb: &'static str,
    pub args: Vec<String>,
}

/// Records every command and answers from a script: commands whose verb is
/// in `fail_on` exit non-zero, `read-mac-address` prints `mac`.
pub struct RecordingBridge {
    pub calls: Vec<Call>,
    pub fail_on: Vec<&'static str>,
    pub mac: String,
    journal: Journal,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Vec::new(),
            mac: "aa:bb:cc:dd:ee:ff\n".to_string(),
            journal: Journal::new(),
        }
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }

    pub fn failing_on(verb: &'static str) -> Self {
        Self {
            fail_on: vec![verb],
            ..Self::new()
        }
    }

    pub fn verbs(&self) -> Vec<&'static str> {
        self.calls.iter().map(|c| c.verb).collect()
    }

    pub fn selectors_for(&self, verb: &str) -> Vec<Option<String>> {
        self.calls
            .iter()
            .filter(|c| c.verb == verb)
            .map(|c| c.selector.clone())
            .collect()
    }
}

impl DeviceBridge for RecordingBridge {
    fn execute(&mut self, selector: Option<&str>, cmd: &BridgeCommand) -> Result<String> {
        self.journal.push(format!("adb:{}", cmd.verb()));
        self.calls.push(Call {
            selector: selector.map(str::to_string),
            verb: cmd.verb(),
            args: cmd.args(),
        });
        if self.fail_on.contains(&cmd.verb()) {
            return Err(ProvisionError::CommandFailed {
                command: cmd.to_string(),
                status: "exit status: 1".into(),
                stderr: String::new(),
            });
        }
        match cmd {
            BridgeCommand::ReadMacAddress => Ok(self.mac.clone()),
            _ => Ok(String::new()),
        }
    }
}

/// Answers confirmations from a fixed budget and `ask` from a queue of
/// lines; once either runs out, input is treated as closed.
pub struct ScriptedOperator {
    pub said: Vec<String>,
    pub prompts: Vec<String>,
    remaining: usize,
    answers: VecDeque<String>,
    journal: Journal,
}

impl ScriptedOperator {
    pub fn confirming(times: usize) -> Self {
        Self {
            said: Vec::new(),
            prompts: Vec::new(),
            remaining: times,
            answers: VecDeque::new(),
            journal: Journal::new(),
        }
    }

    pub fn always() -> Self {
        Self::confirming(usize::MAX)
    }

    pub fn answering(mut self, lines: &[&str]) -> Self {
        self.answers = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = journal.clone();
        self
    }
}

impl Operator for ScriptedOperator {
    fn say(&mut self, msg: &str, _newline: bool) {
        self.journal.push(format!("say:{msg}"));
        self.said.push(msg.to_string());
    }

    fn confirm(&mut self, prompt: &str) -> Result<()> {
        self.journal.push(format!("confirm:{prompt}"));
        self.prompts.push(prompt.to_string());
        if self.remaining == 0 {
            return Err(ProvisionError::OperatorAborted);
        }
        self.remaining -= 1;
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        self.journal.push(format!("ask:{prompt}"));
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}

/// Logs requested delays instead of sleeping.
pub struct RecordingSleeper {
    journal: Journal,
}

impl RecordingSleeper {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, delay: Duration) {
        self.journal.push(format!("sleep:{}", delay.as_secs()));
    }
}

/// A config rooted in `dir` whose assets already exist: a browser package
/// holding the APK entry, and the app APK. No delays.
pub fn fixture_config(dir: &std::path::Path) -> crate::config::ProvisionConfig {
    use std::io::Write;

    let mut cfg = crate::config::ProvisionConfig::default();
    cfg.timings = crate::config::Timings::zero();
    cfg.browser.url = "http://127.0.0.1:9/unreachable.zip".to_string();
    cfg.browser.archive = dir.join("chromium.zip");
    cfg.browser.apk = dir.join("chromium.apk");
    cfg.app_apk = dir.join("app-debug.apk");
    cfg.output_dir = dir.join("out");
    cfg.scratch_dir = dir.join("scratch");

    let file = std::fs::File::create(&cfg.browser.archive).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(
        cfg.browser.entry.as_str(),
        zip::write::SimpleFileOptions::default(),
    )
    .unwrap();
    zip.write_all(b"browser-apk").unwrap();
    zip.finish().unwrap();

    std::fs::write(&cfg.app_apk, b"app-apk").unwrap();
    cfg
}
