//! SRT subtitle cue parsing.

use serde::Serialize;

use crate::timecode::format_timecode;

/// A single subtitle cue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    /// Cue index from the SRT file; cues are ordered by this.
    pub index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Cue text; may contain embedded newlines.
    pub text: String,
}

/// JSON export form of a cue, with timecode-formatted endpoints.
#[derive(Debug, Serialize)]
pub struct SubtitleExport {
    pub start: String,
    pub end: String,
    pub text: String,
}

impl SubtitleCue {
    pub fn export(&self) -> SubtitleExport {
        SubtitleExport {
            start: format_timecode(self.start_ms),
            end: format_timecode(self.end_ms),
            text: self.text.clone(),
        }
    }
}

/// Parse SRT content into cues, sorted by cue index.
///
/// Malformed blocks are skipped rather than failing the whole file.
pub fn parse_srt(content: &str) -> Vec<SubtitleCue> {
    let mut cues = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }

        let Ok(index) = line.parse::<u32>() else {
            continue;
        };
        let Some(timing) = lines.next() else { break };
        let Some((start_ms, end_ms)) = parse_timing_line(timing) else {
            continue;
        };

        let mut text_lines = Vec::new();
        while let Some(&next) = lines.peek() {
            if next.trim().is_empty() {
                lines.next();
                break;
            }
            text_lines.push(lines.next().unwrap_or_default().to_string());
        }

        cues.push(SubtitleCue {
            index,
            start_ms,
            end_ms,
            text: text_lines.join("\n"),
        });
    }

    cues.sort_by_key(|c| c.index);
    cues
}

/// Parse an SRT timing line, e.g. `00:00:10,500 --> 00:00:13,000`.
fn parse_timing_line(line: &str) -> Option<(u64, u64)> {
    let (start, end) = line.split_once("-->")?;
    Some((parse_srt_timecode(start.trim())?, parse_srt_timecode(end.trim())?))
}

/// Parse a single `HH:MM:SS,mmm` SRT timecode into milliseconds.
fn parse_srt_timecode(timecode: &str) -> Option<u64> {
    let mut fields = timecode.split(':');
    let hours: u64 = fields.next()?.parse().ok()?;
    let minutes: u64 = fields.next()?.parse().ok()?;
    let (seconds, millis) = fields.next()?.split_once(',')?;
    if fields.next().is_some() {
        return None;
    }
    let seconds: u64 = seconds.parse().ok()?;
    let millis: u64 = millis.parse().ok()?;
    Some(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}
