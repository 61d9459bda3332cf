use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Bidders that are never blocked regardless of feedback, persisted as
/// line-delimited text so the operator can edit the file while the bot runs.
/// Every membership check re-reads the file, making external edits visible
/// on the very next evaluation.
#[derive(Clone)]
pub(crate) struct Whitelist {
    path: PathBuf,
}

impl Whitelist {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn contains(&self, user_id: &str) -> Result<bool> {
        Ok(self.load()?.contains(user_id))
    }

    pub(crate) fn add(&self, user_id: &str) -> Result<()> {
        let mut users = self.load()?;
        users.insert(user_id.to_owned());
        let mut contents = users.into_iter().collect::<Vec<_>>().join("\n");
        contents.push('\n');
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write whitelist {}", self.path.display()))
    }

    fn load(&self) -> Result<BTreeSet<String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read whitelist {}", self.path.display()))
            }
        };
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("whitelist-{}-{name}.txt", std::process::id()))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let whitelist = Whitelist::new(scratch_path("missing"));
        assert!(!whitelist.contains("alice").unwrap());
    }

    #[test]
    fn add_then_contains_round_trips() {
        let path = scratch_path("round-trip");
        let whitelist = Whitelist::new(&path);

        whitelist.add("carol").unwrap();
        whitelist.add("alice").unwrap();
        assert!(whitelist.contains("carol").unwrap());
        assert!(!whitelist.contains("mallory").unwrap());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn file_is_sorted_line_delimited() {
        let path = scratch_path("sorted");
        let whitelist = Whitelist::new(&path);

        whitelist.add("carol").unwrap();
        whitelist.add("alice").unwrap();
        whitelist.add("bob").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "alice\nbob\ncarol\n");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn external_edits_are_seen_on_next_check() {
        let path = scratch_path("external");
        let whitelist = Whitelist::new(&path);

        assert!(!whitelist.contains("dave").unwrap());
        fs::write(&path, "dave\n").unwrap();
        assert!(whitelist.contains("dave").unwrap());

        fs::remove_file(path).unwrap();
    }
}
