//! Git file status and its badge/tooltip/color projection.
//!
//! The status set mirrors the host Git integration's change enum; the
//! decoration table is static. Colors are opaque theme tokens the host
//! resolves itself.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Status of one changed file, as reported by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FileStatus {
    /// Staged modification.
    IndexModified,
    /// Staged new file.
    IndexAdded,
    /// Staged deletion.
    IndexDeleted,
    /// Staged rename.
    IndexRenamed,
    /// Staged copy.
    IndexCopied,
    /// Working-tree modification.
    Modified,
    /// Working-tree deletion.
    Deleted,
    Untracked,
    Ignored,
    IntentToAdd,
}

/// Theme color token for a decoration. Opaque to this crate; the host maps
/// it onto its theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    Staged,
    Modified,
    Added,
    Deleted,
    Untracked,
    Ignored,
}

impl ColorToken {
    pub fn token(self) -> &'static str {
        match self {
            ColorToken::Staged => "gitDecoration.stageModifiedResourceForeground",
            ColorToken::Modified => "gitDecoration.modifiedResourceForeground",
            ColorToken::Added => "gitDecoration.addedResourceForeground",
            ColorToken::Deleted => "gitDecoration.deletedResourceForeground",
            ColorToken::Untracked => "gitDecoration.untrackedResourceForeground",
            ColorToken::Ignored => "gitDecoration.ignoredResourceForeground",
        }
    }
}

impl From<ColorToken> for &'static str {
    fn from(color: ColorToken) -> Self {
        color.token()
    }
}

impl Display for ColorToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// Serialize as the theme key string the host expects.
impl Serialize for ColorToken {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.token())
    }
}

/// The badge/tooltip/color triple shown on a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decoration {
    pub badge: char,
    pub tooltip: &'static str,
    pub color: ColorToken,
}

impl FileStatus {
    /// Static status → decoration lookup.
    pub fn decoration(self) -> Decoration {
        use ColorToken::*;
        let (badge, tooltip, color) = match self {
            FileStatus::IndexModified => ('M', "Modified", Staged),
            FileStatus::IndexAdded => ('A', "Added", Staged),
            FileStatus::IndexDeleted => ('D', "Deleted", Staged),
            FileStatus::IndexRenamed => ('R', "Renamed", Staged),
            FileStatus::IndexCopied => ('C', "Copied", Staged),
            FileStatus::Modified => ('M', "Modified", Modified),
            FileStatus::Deleted => ('D', "Deleted", Deleted),
            FileStatus::Untracked => ('U', "Untracked", Untracked),
            FileStatus::Ignored => ('I', "Ignored", Ignored),
            FileStatus::IntentToAdd => ('?', "Intent to Add", Added),
        };
        Decoration {
            badge,
            tooltip,
            color,
        }
    }
}
