const CHANGELOG_HEADER: &str = "# Changelog\n";

/// An existing changelog's full text, with newest-first entry insertion.
///
/// Content outside the insertion point is preserved byte-for-byte.
#[derive(Debug, Clone)]
pub struct Changelog {
    content: String,
}

impl Default for Changelog {
    fn default() -> Self {
        Self::new()
    }
}

impl Changelog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            content: CHANGELOG_HEADER.to_string(),
        }
    }

    #[must_use]
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn into_content(self) -> String {
        self.content
    }

    /// Inserts a rendered release entry after the preamble and before the
    /// most recent existing entry.
    pub fn add_entry(&mut self, entry: &str) {
        let insertion_point = self.find_insertion_point();

        let mut new_content =
            String::with_capacity(self.content.len() + entry.len() + 2);
        new_content.push_str(&self.content[..insertion_point]);

        if !new_content.is_empty() && !new_content.ends_with("\n\n") {
            if new_content.ends_with('\n') {
                new_content.push('\n');
            } else {
                new_content.push_str("\n\n");
            }
        }

        new_content.push_str(entry.trim_end());
        new_content.push('\n');

        if insertion_point < self.content.len() {
            new_content.push('\n');
            new_content.push_str(&self.content[insertion_point..]);
        }

        self.content = new_content;
    }

    /// True when an entry for `version` is already staged in this changelog.
    #[must_use]
    pub fn has_entry_for(&self, version: &semver::Version) -> bool {
        self.content.lines().any(|line| {
            let line = line.trim_start();
            line.starts_with(&format!("## {version} "))
                || line.starts_with(&format!("## [{version}]"))
        })
    }

    fn find_insertion_point(&self) -> usize {
        if self.content.starts_with("## ") {
            return 0;
        }
        if let Some(pos) = self.content.find("\n## ") {
            return pos + 1;
        }
        self.content.len()
    }
}
