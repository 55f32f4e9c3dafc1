//! Small rules used by the unit tests of this crate.

use std::sync::Mutex;

use migrate_api::{keep, single, Message, MigrationRule, RuleError, RuleOutput, Version};

pub(crate) fn text(s: &str) -> Message {
    Message::raw(s.as_bytes().to_vec())
}

/// Returns every topic unchanged.
pub(crate) struct Identity(pub Version);

impl MigrationRule for Identity {
    fn version(&self) -> Version {
        self.0
    }

    fn name(&self) -> &str {
        "identity"
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        Ok(keep(topic, message))
    }
}

/// Moves `from` to `to`, keeps everything else.
pub(crate) struct Rename {
    pub version: Version,
    pub from: &'static str,
    pub to: &'static str,
}

impl MigrationRule for Rename {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &str {
        "rename"
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        if topic == self.from {
            Ok(single(self.to, message.clone()))
        } else {
            Ok(keep(topic, message))
        }
    }
}

/// Splits `topic` into `topic/a` and `topic/b`.
pub(crate) struct Split {
    pub version: Version,
    pub topic: &'static str,
}

impl MigrationRule for Split {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &str {
        "split"
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        if topic != self.topic {
            return Ok(keep(topic, message));
        }
        let mut out = RuleOutput::new();
        out.insert(format!("{topic}/a"), text("part-a"));
        out.insert(format!("{topic}/b"), text("part-b"));
        Ok(out)
    }
}

/// Replaces the payload of `topic`.
pub(crate) struct Replace {
    pub version: Version,
    pub topic: &'static str,
    pub payload: &'static str,
}

impl MigrationRule for Replace {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &str {
        "replace"
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        if topic == self.topic {
            Ok(single(topic, text(self.payload)))
        } else {
            Ok(keep(topic, message))
        }
    }
}

/// Returns an empty map for `topic`, dropping it.
pub(crate) struct Discard {
    pub version: Version,
    pub topic: &'static str,
}

impl MigrationRule for Discard {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &str {
        "discard"
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        if topic == self.topic {
            Ok(RuleOutput::new())
        } else {
            Ok(keep(topic, message))
        }
    }
}

/// Fails on `topic`.
pub(crate) struct Fail {
    pub version: Version,
    pub topic: &'static str,
}

impl MigrationRule for Fail {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &str {
        "fail"
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        if topic == self.topic {
            Err(RuleError::schema("unexpected payload"))
        } else {
            Ok(keep(topic, message))
        }
    }
}

/// Identity that records the topics it was called with.
pub(crate) struct Observe {
    pub version: Version,
    pub seen: Mutex<Vec<String>>,
}

impl Observe {
    pub(crate) fn new(version: Version) -> Self {
        Self {
            version,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl MigrationRule for Observe {
    fn version(&self) -> Version {
        self.version
    }

    fn name(&self) -> &str {
        "observe"
    }

    fn migrate(&self, topic: &str, message: &Message) -> Result<RuleOutput, RuleError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(topic.to_string());
        }
        Ok(keep(topic, message))
    }
}
