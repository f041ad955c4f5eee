use url::Url;

use crate::error::ChangelogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forge {
    GitHub,
    GitLab,
    Bitbucket,
    Gitea,
}

/// A parsed repository URL used to build commit, issue and comparison links
/// in rendered changelog entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInfo {
    pub forge: Forge,
    pub owner: String,
    pub repo: String,
    pub base_url: Url,
}

impl RepositoryInfo {
    /// # Errors
    ///
    /// Returns `ChangelogError::UrlParse` if the URL is invalid or
    /// `ChangelogError::InvalidRepositoryPath` if it lacks owner/repo
    /// segments.
    pub fn from_url(url_str: &str) -> Result<Self, ChangelogError> {
        let url = Url::parse(url_str).map_err(|source| ChangelogError::UrlParse {
            url: url_str.to_string(),
            source,
        })?;

        let host = url.host_str().ok_or_else(|| ChangelogError::UrlParse {
            url: url_str.to_string(),
            source: url::ParseError::EmptyHost,
        })?;

        let forge = detect_forge(host);
        let (owner, repo) = extract_owner_repo(&url)?;

        let base_url = Url::parse(&format!("{}://{}", url.scheme(), host)).map_err(|source| {
            ChangelogError::UrlParse {
                url: url_str.to_string(),
                source,
            }
        })?;

        Ok(Self {
            forge,
            owner,
            repo,
            base_url,
        })
    }

    #[must_use]
    pub fn commit_url(&self, sha: &str) -> String {
        match self.forge {
            Forge::GitHub | Forge::Gitea => {
                format!("{}{}/{}/commit/{sha}", self.base_url, self.owner, self.repo)
            }
            Forge::GitLab => format!(
                "{}{}/{}/-/commit/{sha}",
                self.base_url, self.owner, self.repo
            ),
            Forge::Bitbucket => format!(
                "{}{}/{}/commits/{sha}",
                self.base_url, self.owner, self.repo
            ),
        }
    }

    #[must_use]
    pub fn issue_url(&self, issue: &str) -> String {
        match self.forge {
            Forge::GitHub | Forge::Gitea => {
                format!("{}{}/{}/issues/{issue}", self.base_url, self.owner, self.repo)
            }
            Forge::GitLab => format!(
                "{}{}/{}/-/issues/{issue}",
                self.base_url, self.owner, self.repo
            ),
            Forge::Bitbucket => format!(
                "{}{}/{}/issues/{issue}",
                self.base_url, self.owner, self.repo
            ),
        }
    }

    #[must_use]
    pub fn comparison_url(&self, base_tag: &str, target_tag: &str) -> String {
        match self.forge {
            Forge::GitHub | Forge::Gitea => format!(
                "{}{}/{}/compare/{base_tag}...{target_tag}",
                self.base_url, self.owner, self.repo
            ),
            Forge::GitLab => format!(
                "{}{}/{}/-/compare/{base_tag}...{target_tag}",
                self.base_url, self.owner, self.repo
            ),
            Forge::Bitbucket => format!(
                "{}{}/{}/branches/compare/{target_tag}..{base_tag}",
                self.base_url, self.owner, self.repo
            ),
        }
    }
}

fn detect_forge(host: &str) -> Forge {
    let host = host.to_lowercase();

    if host == "github.com" || host.ends_with(".github.com") {
        Forge::GitHub
    } else if host == "gitlab.com" || host.starts_with("gitlab.") || host.contains(".gitlab.") {
        Forge::GitLab
    } else if host == "bitbucket.org" || host.ends_with(".bitbucket.org") {
        Forge::Bitbucket
    } else if host == "codeberg.org" || host.starts_with("gitea.") {
        Forge::Gitea
    } else {
        Forge::GitHub
    }
}

fn extract_owner_repo(url: &Url) -> Result<(String, String), ChangelogError> {
    let path = url.path().trim_start_matches('/').trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.len() < 2 {
        return Err(ChangelogError::InvalidRepositoryPath {
            url: url.to_string(),
        });
    }

    Ok((segments[0].to_string(), segments[1].to_string()))
}
