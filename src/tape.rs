//! Recorder tape scripts.
//!
//! A [`Tape`] is a typed list of recorder commands. [`Tape::for_job`] builds the script that plays
//! one story and captures it; `Display` renders the text the recorder reads.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::directive::MediaKind;
use crate::foundation::error::{StoriesError, StoriesResult};
use crate::scan::Job;

pub const GIF_FRAMERATE: u32 = 23;
pub const GIF_PLAYBACK_SPEED: f32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub enum Setting {
    Padding(u32),
    Framerate(u32),
    PlaybackSpeed(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum TapeCommand {
    Output(PathBuf),
    Set(Setting),
    Hide,
    Show,
    Type(String),
    Enter,
    Sleep(Duration),
    Screenshot(PathBuf),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tape {
    commands: Vec<TapeCommand>,
}

impl Tape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, cmd: TapeCommand) -> Self {
        self.commands.push(cmd);
        self
    }

    pub fn commands(&self) -> &[TapeCommand] {
        &self.commands
    }

    /// The script that plays `job` with `story_program` and captures it to `job.output`.
    ///
    /// GIFs record the whole session once the terminal is shown. PNGs wait for the story to settle
    /// and take a single screenshot.
    pub fn for_job(job: &Job, story_program: &str) -> StoriesResult<Self> {
        let typed = format!("{story_program} -s {} && clear", job.command);
        quote_for_type(&typed)?;
        quote_for_type(&job.output.display().to_string())?;

        let tape = match job.kind {
            MediaKind::Gif => Tape::new()
                .push(TapeCommand::Output(job.output.clone()))
                .push(TapeCommand::Set(Setting::Padding(0)))
                .push(TapeCommand::Set(Setting::Framerate(GIF_FRAMERATE)))
                .push(TapeCommand::Set(Setting::PlaybackSpeed(GIF_PLAYBACK_SPEED)))
                .push(TapeCommand::Hide)
                .push(TapeCommand::Type(typed))
                .push(TapeCommand::Enter)
                .push(TapeCommand::Sleep(Duration::from_millis(500)))
                .push(TapeCommand::Show)
                .push(TapeCommand::Sleep(Duration::from_secs(8))),
            MediaKind::Png => Tape::new()
                .push(TapeCommand::Set(Setting::Padding(0)))
                .push(TapeCommand::Hide)
                .push(TapeCommand::Type(typed))
                .push(TapeCommand::Enter)
                .push(TapeCommand::Sleep(Duration::from_secs(2)))
                .push(TapeCommand::Show)
                .push(TapeCommand::Sleep(Duration::from_secs(1)))
                .push(TapeCommand::Screenshot(job.output.clone())),
        };
        Ok(tape)
    }
}

/// Where the tape for `output` is written: same path, `.tape` extension.
pub fn tape_path(output: &Path) -> PathBuf {
    output.with_extension("tape")
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cmd in &self.commands {
            writeln!(f, "{cmd}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TapeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapeCommand::Output(p) => write!(f, "Output {}", path_arg(p)),
            TapeCommand::Set(s) => write!(f, "Set {s}"),
            TapeCommand::Hide => f.write_str("Hide"),
            TapeCommand::Show => f.write_str("Show"),
            TapeCommand::Type(text) => {
                // Checked in `Tape::for_job`; fall back to double quotes for hand-built tapes.
                let q = quote_for_type(text).unwrap_or('"');
                write!(f, "Type {q}{text}{q}")
            }
            TapeCommand::Enter => f.write_str("Enter"),
            TapeCommand::Sleep(d) => write!(f, "Sleep {}", format_duration(*d)),
            TapeCommand::Screenshot(p) => write!(f, "Screenshot {}", path_arg(p)),
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Padding(v) => write!(f, "Padding {v}"),
            Setting::Framerate(v) => write!(f, "Framerate {v}"),
            Setting::PlaybackSpeed(v) => write!(f, "PlaybackSpeed {v}"),
        }
    }
}

/// Pick a string delimiter the recorder accepts that does not occur in `text`.
fn quote_for_type(text: &str) -> StoriesResult<char> {
    ['"', '\'', '`']
        .into_iter()
        .find(|q| !text.contains(*q))
        .ok_or_else(|| {
            StoriesError::directive(format!(
                "cannot quote for the recorder (uses \", ' and ` at once): {text}"
            ))
        })
}

/// Paths go out bare unless they hold whitespace or quotes, which the recorder would split on.
fn path_arg(p: &Path) -> String {
    let text = p.display().to_string();
    let needs_quotes = text
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '`'));
    if !needs_quotes {
        return text;
    }
    let q = quote_for_type(&text).unwrap_or('"');
    format!("{q}{text}{q}")
}

fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(kind: MediaKind, output: &str, command: &str) -> Job {
        Job {
            output: PathBuf::from(output),
            command: command.to_string(),
            kind,
        }
    }

    #[test]
    fn gif_tape_records_whole_session() {
        let tape = Tape::for_job(
            &job(MediaKind::Gif, "./src/images/demo.gif", "cy test bar"),
            "./storybook",
        )
        .unwrap();
        let expected = "\
Output ./src/images/demo.gif
Set Padding 0
Set Framerate 23
Set PlaybackSpeed 0.5
Hide
Type \"./storybook -s cy test bar && clear\"
Enter
Sleep 500ms
Show
Sleep 8s
";
        assert_eq!(tape.to_string(), expected);
    }

    #[test]
    fn png_tape_ends_with_screenshot() {
        let tape = Tape::for_job(
            &job(MediaKind::Png, "./src/images/abc.png", "cy test foo"),
            "./storybook",
        )
        .unwrap();
        let expected = "\
Set Padding 0
Hide
Type \"./storybook -s cy test foo && clear\"
Enter
Sleep 2s
Show
Sleep 1s
Screenshot ./src/images/abc.png
";
        assert_eq!(tape.to_string(), expected);
        assert!(
            !tape
                .commands()
                .iter()
                .any(|c| matches!(c, TapeCommand::Output(_)))
        );
    }

    #[test]
    fn type_switches_delimiter_when_command_has_quotes() {
        let tape = Tape::for_job(
            &job(MediaKind::Png, "a.png", r#"echo "hi""#),
            "./storybook",
        )
        .unwrap();
        assert!(
            tape.to_string()
                .contains(r#"Type './storybook -s echo "hi" && clear'"#)
        );
    }

    #[test]
    fn command_using_every_delimiter_is_rejected() {
        let err = Tape::for_job(&job(MediaKind::Png, "a.png", r#"" ' `"#), "./storybook")
            .unwrap_err();
        assert!(matches!(err, StoriesError::Directive(_)));
    }

    #[test]
    fn output_paths_with_spaces_are_quoted() {
        let gif = Tape::for_job(
            &job(MediaKind::Gif, "./my book/src/images/demo.gif", "cy"),
            "./storybook",
        )
        .unwrap();
        assert!(
            gif.to_string()
                .starts_with("Output \"./my book/src/images/demo.gif\"\n")
        );

        let png = Tape::for_job(
            &job(MediaKind::Png, "./it's here/a.png", "cy"),
            "./storybook",
        )
        .unwrap();
        assert!(
            png.to_string()
                .ends_with("Screenshot \"./it's here/a.png\"\n")
        );
    }

    #[test]
    fn output_path_using_every_delimiter_is_rejected() {
        let err = Tape::for_job(
            &job(MediaKind::Png, r#"./a"b'c`d/x.png"#, "cy"),
            "./storybook",
        )
        .unwrap_err();
        assert!(matches!(err, StoriesError::Directive(_)));
    }

    #[test]
    fn tape_sits_next_to_output() {
        assert_eq!(
            tape_path(Path::new("./src/images/demo.gif")),
            PathBuf::from("./src/images/demo.tape")
        );
        assert_eq!(
            tape_path(Path::new("./src/images/png.png")),
            PathBuf::from("./src/images/png.tape")
        );
    }

    #[test]
    fn durations_prefer_whole_seconds() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(8)), "8s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
    }
}
