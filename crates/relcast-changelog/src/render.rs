use std::fmt::Write;

use chrono::NaiveDate;
use semver::Version;

use relcast_core::{ParsedCommit, SectionConfig};

use crate::forge::RepositoryInfo;

const BREAKING_SECTION_TITLE: &str = "Breaking Changes";

/// Everything the renderer needs besides the commits themselves.
#[derive(Debug, Clone)]
pub struct ReleaseMetadata {
    pub version: Version,
    pub tag: Option<String>,
    pub previous_tag: Option<String>,
    pub date: NaiveDate,
    pub repository: Option<RepositoryInfo>,
}

impl ReleaseMetadata {
    #[must_use]
    pub fn new(version: Version, date: NaiveDate) -> Self {
        Self {
            version,
            tag: None,
            previous_tag: None,
            date,
            repository: None,
        }
    }

    fn target_tag(&self) -> String {
        self.tag
            .clone()
            .unwrap_or_else(|| format!("v{}", self.version))
    }
}

/// Renders one release's changelog entry.
///
/// Breaking-change notes lead regardless of the triggering commit's type,
/// then the configured sections in their declared order. Sections with no
/// commits are omitted; hidden sections never render.
#[must_use]
pub fn render_entry(
    commits: &[ParsedCommit],
    sections: &[SectionConfig],
    meta: &ReleaseMetadata,
) -> String {
    let mut out = format_header(meta);

    let notes: Vec<&str> = commits
        .iter()
        .flat_map(|c| c.notes.iter().map(|n| n.text.as_str()))
        .collect();
    if !notes.is_empty() {
        let _ = write!(out, "\n\n### {BREAKING_SECTION_TITLE}\n");
        for note in notes {
            let _ = write!(out, "\n* {note}");
        }
    }

    for section in sections.iter().filter(|s| !s.hidden) {
        let members: Vec<&ParsedCommit> = commits
            .iter()
            .filter(|c| c.commit_type == section.commit_type)
            .collect();
        if members.is_empty() {
            continue;
        }

        let _ = write!(out, "\n\n### {}\n", section.title);
        for commit in members {
            out.push_str("\n* ");
            out.push_str(&format_commit_line(commit, meta.repository.as_ref()));
        }
    }

    out.push('\n');
    out
}

fn format_header(meta: &ReleaseMetadata) -> String {
    match (&meta.repository, &meta.previous_tag) {
        (Some(repo), Some(previous)) => {
            let compare = repo.comparison_url(previous, &meta.target_tag());
            format!("## [{}]({compare}) ({})", meta.version, meta.date)
        }
        _ => format!("## {} ({})", meta.version, meta.date),
    }
}

fn format_commit_line(commit: &ParsedCommit, repository: Option<&RepositoryInfo>) -> String {
    let mut line = String::new();

    if let Some(scope) = &commit.scope {
        let _ = write!(line, "**{scope}:** ");
    }
    line.push_str(&commit.subject);

    if let Some(sha) = &commit.sha {
        let short = sha.get(..7).unwrap_or(sha);
        match repository {
            Some(repo) => {
                let _ = write!(line, " ([{short}]({}))", repo.commit_url(sha));
            }
            None => {
                let _ = write!(line, " ({short})");
            }
        }
    }

    for reference in &commit.references {
        match repository {
            Some(repo) => {
                let _ = write!(
                    line,
                    ", closes [#{}]({})",
                    reference.issue,
                    repo.issue_url(&reference.issue)
                );
            }
            None => {
                let _ = write!(line, ", closes #{}", reference.issue);
            }
        }
    }

    line
}

/// True when an entry carries no user-facing change: after removing the
/// version header line, no non-blank content remains. Upstream uses this
/// to skip a release entirely.
#[must_use]
pub fn changelog_empty(entry: &str) -> bool {
    let mut lines = entry.lines();

    let Some(first) = lines.next() else {
        return true;
    };

    if !first.trim_start().starts_with("## ") && !first.trim().is_empty() {
        return false;
    }

    lines.all(|l| l.trim().is_empty())
}

/// Merges extra bullet lines into an entry's `### {title}` section,
/// creating the section at the end of the entry when absent.
#[must_use]
pub fn merge_section(entry: &str, title: &str, lines: &[String]) -> String {
    let heading = format!("### {title}");

    if let Some(pos) = entry.find(&heading) {
        let after = pos + heading.len();
        let section_end = entry[after..]
            .find("\n### ")
            .map_or(entry.len(), |p| after + p);

        let mut out = String::with_capacity(entry.len() + 64);
        out.push_str(entry[..section_end].trim_end());
        for line in lines {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');

        let rest = &entry[section_end..];
        if !rest.trim().is_empty() {
            out.push_str(rest);
        }
        out
    } else {
        let mut out = entry.trim_end().to_string();
        let _ = write!(out, "\n\n{heading}\n");
        for line in lines {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out
    }
}

/// A synthetic entry for a release whose only content is dependency bumps.
#[must_use]
pub fn dependency_entry(
    version: &Version,
    date: NaiveDate,
    title: &str,
    notes: &[String],
) -> String {
    let mut out = format!("## {version} ({date})\n\n### {title}\n");
    for note in notes {
        out.push('\n');
        out.push_str(note);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use relcast_commit::interpret_commits;
    use relcast_core::{Commit, default_sections};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).expect("valid date")
    }

    fn interpret(messages: &[&str]) -> Vec<ParsedCommit> {
        let commits: Vec<Commit> = messages
            .iter()
            .enumerate()
            .map(|(i, m)| Commit::new(format!("abcdef{i}0000"), *m))
            .collect();
        interpret_commits(&commits)
    }

    #[test]
    fn sections_follow_declared_order() {
        let commits = interpret(&["fix: squash bug", "feat: add thing"]);
        let entry = render_entry(
            &commits,
            &default_sections(),
            &ReleaseMetadata::new(Version::new(1, 1, 0), date()),
        );

        let features = entry.find("### Features").expect("Features section");
        let fixes = entry.find("### Bug Fixes").expect("Bug Fixes section");
        assert!(features < fixes, "Features is declared before Bug Fixes");
    }

    #[test]
    fn empty_sections_are_omitted() {
        let commits = interpret(&["fix: only a fix"]);
        let entry = render_entry(
            &commits,
            &default_sections(),
            &ReleaseMetadata::new(Version::new(1, 0, 1), date()),
        );

        assert!(entry.contains("### Bug Fixes"));
        assert!(!entry.contains("### Features"));
    }

    #[test]
    fn hidden_sections_never_render() {
        let commits = interpret(&["chore: bump deps", "fix: real change"]);
        let entry = render_entry(
            &commits,
            &default_sections(),
            &ReleaseMetadata::new(Version::new(1, 0, 1), date()),
        );

        assert!(!entry.contains("Miscellaneous Chores"));
        assert!(!entry.contains("bump deps"));
    }

    #[test]
    fn breaking_notes_lead_the_entry() {
        let commits = interpret(&["feat: nice addition", "fix!: drop legacy flag"]);
        let entry = render_entry(
            &commits,
            &default_sections(),
            &ReleaseMetadata::new(Version::new(2, 0, 0), date()),
        );

        let breaking = entry.find("### Breaking Changes").expect("breaking section");
        let features = entry.find("### Features").expect("features section");
        assert!(breaking < features);
        assert!(entry.contains("* drop legacy flag"));
    }

    #[test]
    fn commit_and_issue_links_rendered_with_repository() {
        let commits = interpret(&["fix(core): stop the leak\n\nFixes #12"]);
        let mut meta = ReleaseMetadata::new(Version::new(1, 0, 1), date());
        meta.repository =
            Some(RepositoryInfo::from_url("https://github.com/owner/repo").expect("valid url"));

        let entry = render_entry(&commits, &default_sections(), &meta);

        assert!(entry.contains(
            "* **core:** stop the leak ([abcdef0](https://github.com/owner/repo/commit/abcdef00000))"
        ));
        assert!(entry.contains(", closes [#12](https://github.com/owner/repo/issues/12)"));
    }

    #[test]
    fn header_links_comparison_when_previous_tag_known() {
        let commits = interpret(&["fix: x"]);
        let mut meta = ReleaseMetadata::new(Version::new(1, 0, 1), date());
        meta.repository =
            Some(RepositoryInfo::from_url("https://github.com/owner/repo").expect("valid url"));
        meta.previous_tag = Some("v1.0.0".to_string());

        let entry = render_entry(&commits, &default_sections(), &meta);

        assert!(entry.starts_with(
            "## [1.0.1](https://github.com/owner/repo/compare/v1.0.0...v1.0.1) (2026-03-14)"
        ));
    }

    #[test]
    fn changelog_empty_true_for_header_only() {
        assert!(changelog_empty("## 1.0.1 (2026-03-14)\n\n"));
    }

    #[test]
    fn changelog_empty_false_once_a_bullet_exists() {
        assert!(!changelog_empty("## 1.0.1 (2026-03-14)\n\n### Bug Fixes\n\n* x\n"));
    }

    #[test]
    fn changelog_empty_on_rendered_hidden_only_entry() {
        let commits = interpret(&["chore: tidy"]);
        let entry = render_entry(
            &commits,
            &default_sections(),
            &ReleaseMetadata::new(Version::new(1, 0, 1), date()),
        );
        assert!(changelog_empty(&entry));
    }

    #[test]
    fn merge_section_appends_to_existing_section() {
        let entry = "## 1.0.1 (2026-03-14)\n\n### Dependencies\n\n* a bumped from 1.0.0 to 1.0.1\n";
        let merged = merge_section(
            entry,
            "Dependencies",
            &["* b bumped from 2.0.0 to 2.0.1".to_string()],
        );

        assert!(merged.contains("* a bumped from 1.0.0 to 1.0.1\n* b bumped from 2.0.0 to 2.0.1"));
    }

    #[test]
    fn merge_section_preserves_following_sections() {
        let entry =
            "## 1.0.1 (2026-03-14)\n\n### Dependencies\n\n* a bumped\n\n### Bug Fixes\n\n* x\n";
        let merged = merge_section(entry, "Dependencies", &["* b bumped".to_string()]);

        assert!(merged.contains("* a bumped\n* b bumped"));
        assert!(merged.contains("### Bug Fixes"));
    }

    #[test]
    fn merge_section_creates_missing_section() {
        let entry = "## 1.0.1 (2026-03-14)\n\n### Bug Fixes\n\n* x\n";
        let merged = merge_section(entry, "Dependencies", &["* dep bumped".to_string()]);

        assert!(merged.contains("### Dependencies\n\n* dep bumped"));
        assert!(merged.find("### Bug Fixes") < merged.find("### Dependencies"));
    }

    #[test]
    fn dependency_entry_shape() {
        let entry = dependency_entry(
            &Version::new(2, 2, 3),
            date(),
            "Dependencies",
            &["* left-pad bumped from 1.1.1 to 1.1.2".to_string()],
        );

        assert!(entry.starts_with("## 2.2.3 (2026-03-14)"));
        assert!(entry.contains("### Dependencies\n\n* left-pad bumped from 1.1.1 to 1.1.2"));
        assert!(!changelog_empty(&entry));
    }
}
