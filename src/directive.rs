//! The `{{story [<name>.]<png|gif> <command>}}` directive.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use sha2::Digest as _;

/// Number of hex characters of the command digest used for anonymous stories.
pub const HASH_PREFIX_LEN: usize = 12;

// The command stops at the first `}}` on the line so that two directives on one line stay apart.
static STORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{story (?:(\w+)\.)?(png|gif) (.+?)\}\}").expect("story directive regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Png,
    Gif,
}

impl MediaKind {
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Png => "png",
            MediaKind::Gif => "gif",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "png" => Some(MediaKind::Png),
            "gif" => Some(MediaKind::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One directive found in chapter content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoryRef<'a> {
    /// Byte range of the whole directive within the scanned text.
    pub span: Range<usize>,
    pub name: Option<&'a str>,
    pub kind: MediaKind,
    pub command: &'a str,
}

impl StoryRef<'_> {
    /// `<name>.<ext>`, or `<sha256(command)[..12]>.<ext>` when no name was given.
    pub fn file_name(&self) -> String {
        let stem = match self.name {
            Some(name) => name.to_string(),
            None => command_digest(self.command),
        };
        format!("{stem}.{}", self.kind)
    }
}

/// Find every well-formed directive in `content`, in ascending offset order.
///
/// Directives whose command is blank are not returned; they stay in the text untouched.
pub fn find_stories(content: &str) -> Vec<StoryRef<'_>> {
    STORY_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let kind = MediaKind::from_extension(caps.get(2)?.as_str())?;
            let command = caps.get(3)?.as_str();
            if command.trim().is_empty() {
                return None;
            }
            Some(StoryRef {
                span: whole.range(),
                name: caps.get(1).map(|m| m.as_str()),
                kind,
                command,
            })
        })
        .collect()
}

/// First [`HASH_PREFIX_LEN`] hex characters of the SHA-256 digest of `command`.
pub fn command_digest(command: &str) -> String {
    let digest = sha2::Sha256::digest(command.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out.truncate(HASH_PREFIX_LEN);
    out
}
