use crate::{delta::Command, types::Version};

/// One structural scan's worth of commands, stamped with the version the
/// scan ran at.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    pub version: Version,
    pub actions: Vec<Command>,
}

/// Append-only, version-ordered record of structural operations.
///
/// Every observer replays from its own last-acknowledged version, so the
/// log keeps the full history of a sequence's structural life. The one
/// exception is `Clear`: an empty sequence subsumes everything that came
/// before it, so the log collapses to a single `Clear` entry.
#[derive(Default)]
pub struct ActionLog {
    entries: Vec<LogEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Append one entry. Versions must be non-decreasing in log order.
    pub fn append(&mut self, version: Version, actions: Vec<Command>) {
        debug_assert!(
            self.entries.last().map_or(true, |e| e.version <= version),
            "action log versions must be non-decreasing"
        );
        self.entries.push(LogEntry { version, actions });
    }

    /// Collapse the log to a single `Clear` entry at `version`.
    pub fn reset_to_clear(&mut self, version: Version) {
        self.entries = vec![LogEntry {
            version,
            actions: vec![Command::Clear],
        }];
    }

    /// Index of the first entry with `version >= at`, by binary search.
    pub fn first_at_or_after(&self, at: Version) -> usize {
        self.entries.partition_point(|e| e.version < at)
    }

    /// Concatenate the commands of every entry stamped strictly after
    /// `since`. `since <= 0` replays the whole log.
    pub fn replay_since(&self, since: Version) -> Vec<Command> {
        let start = if since <= 0 {
            0
        } else {
            self.first_at_or_after(since + 1)
        };
        self.entries[start..]
            .iter()
            .flat_map(|e| e.actions.iter().cloned())
            .collect()
    }
}
