use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::warn;

use relcast_core::{Commit, Note, ParsedCommit, Reference};

use crate::error::ParseError;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^()]*)\))?(?P<breaking>!)?: (?P<subject>.+)$")
        .expect("header pattern is valid")
});

static FOOTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<key>BREAKING CHANGE|BREAKING-CHANGE|[A-Za-z][A-Za-z0-9-]*)(?::[ \t]+(?P<value>.*)|[ \t]+#(?P<issue>[^\s,]+).*)$",
    )
    .expect("footer pattern is valid")
});

const BREAKING_NOTE_TITLE: &str = "BREAKING CHANGE";

/// A footer under construction while walking the message lines.
struct Footer {
    key: String,
    text: String,
    /// Original value lines, kept so a nested commit message can be
    /// reconstructed without the continuation joining applied to `text`.
    raw: Vec<String>,
    reference: bool,
    extended: bool,
}

impl Footer {
    fn new(key: &str, value: &str, reference: bool) -> Self {
        Self {
            key: key.to_string(),
            text: value.trim().to_string(),
            raw: vec![value.to_string()],
            reference,
            extended: false,
        }
    }

    fn is_breaking_key(&self) -> bool {
        self.key == "BREAKING CHANGE" || self.key == "BREAKING-CHANGE"
    }

    /// A continuation line opening a markdown level-4 heading or a bullet
    /// switches the footer into extended context: that line and every later
    /// one keep their own (indented) line. Anything else joins the running
    /// text with a single space.
    fn push_continuation(&mut self, line: &str) {
        self.raw.push(line.to_string());
        let trimmed = line.trim_start();
        if self.extended
            || trimmed.starts_with("#### ")
            || trimmed.starts_with("* ")
            || trimmed.starts_with("- ")
        {
            self.extended = true;
            self.text.push('\n');
            self.text.push_str("    ");
            self.text.push_str(trimmed);
        } else {
            self.text.push(' ');
            self.text.push_str(trimmed);
        }
    }

    fn reconstruct_message(&self) -> String {
        format!("{}: {}", self.key, self.raw.join("\n"))
    }
}

/// Interprets one raw commit message into structured records.
///
/// Normally one record comes back; footers that are themselves conventional
/// commit messages (squashed aggregate commits) produce additional records,
/// all sharing the caller's `sha`.
///
/// # Errors
///
/// Returns `ParseError` when the message is empty or its header does not
/// follow `type(scope)!: subject`.
#[must_use = "parsing result should be handled"]
pub fn interpret_message(
    sha: Option<&str>,
    message: &str,
) -> Result<Vec<ParsedCommit>, ParseError> {
    let mut lines = message.lines();

    let header = lines
        .find(|l| !l.trim().is_empty())
        .ok_or(ParseError::Empty)?
        .trim_end();

    let caps = HEADER_RE.captures(header).ok_or_else(|| ParseError::Header {
        line: header.to_string(),
    })?;

    let commit_type = caps["type"].to_lowercase();
    let scope = caps
        .name("scope")
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty());
    let marker_breaking = caps.name("breaking").is_some();
    let subject = caps["subject"].trim().to_string();

    let mut body_lines: Vec<&str> = Vec::new();
    let mut footers: Vec<Footer> = Vec::new();

    for line in lines {
        let line = line.trim_end();

        if let Some(caps) = FOOTER_RE.captures(line) {
            let key = &caps["key"];
            if let Some(value) = caps.name("value") {
                footers.push(Footer::new(key, value.as_str(), false));
            } else if let Some(issue) = caps.name("issue") {
                footers.push(Footer::new(key, issue.as_str(), true));
            }
        } else if let Some(current) = footers.last_mut() {
            if !line.trim().is_empty() {
                current.push_continuation(line);
            }
        } else {
            body_lines.push(line);
        }
    }

    while body_lines.first().is_some_and(|l| l.trim().is_empty()) {
        body_lines.remove(0);
    }
    while body_lines.last().is_some_and(|l| l.trim().is_empty()) {
        body_lines.pop();
    }
    let body = body_lines.join("\n");

    let mut breaking = marker_breaking;
    let mut notes = Vec::new();
    let mut references = Vec::new();
    let mut footer_map = IndexMap::new();
    let mut nested = Vec::new();

    for footer in footers {
        if footer.is_breaking_key() {
            breaking = true;
            notes.push(Note {
                title: BREAKING_NOTE_TITLE.to_string(),
                text: footer.text.clone(),
            });
            continue;
        }

        if footer.reference {
            references.push(Reference {
                action: footer.key.clone(),
                issue: footer.text.clone(),
            });
            footer_map.insert(footer.key, format!("#{}", footer.text));
            continue;
        }

        if is_type_token(&footer.key) {
            // A footer like `fix: also handle empty input` is a nested
            // conventional commit from a squash; reparse it as its own
            // message. Keys that fail to reparse stay plain footers.
            if let Ok(mut parsed) = interpret_message(sha, &footer.reconstruct_message()) {
                nested.append(&mut parsed);
                continue;
            }
        }

        footer_map.insert(footer.key, footer.text);
    }

    if breaking && notes.is_empty() {
        notes.push(Note {
            title: BREAKING_NOTE_TITLE.to_string(),
            text: subject.clone(),
        });
    }

    let mut result = vec![ParsedCommit {
        sha: sha.map(ToString::to_string),
        commit_type,
        scope,
        breaking,
        subject,
        body,
        notes,
        footers: footer_map,
        references,
    }];
    result.append(&mut nested);

    Ok(result)
}

fn is_type_token(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphabetic())
}

/// Interprets a batch of raw commits. Messages that fail to parse are
/// dropped with a warning; they are not fatal for the batch.
#[must_use]
pub fn interpret_commits(commits: &[Commit]) -> Vec<ParsedCommit> {
    let mut out = Vec::new();

    for commit in commits {
        match interpret_message(commit.sha.as_deref(), &commit.message) {
            Ok(mut parsed) => out.append(&mut parsed),
            Err(error) => {
                warn!(
                    sha = commit.sha.as_deref().unwrap_or("<no sha>"),
                    %error,
                    "dropping commit with non-conventional message"
                );
            }
        }
    }

    out
}
