//! Domain types for refrain-io.

use crate::IoError;

/// Name of one analysis run, used as the stem of its result files.
///
/// [`ResultWriter`](crate::ResultWriter) writes `{run}_family.json` for a
/// path family and `{run}_distances.json` for a distance matrix, so the name
/// must be a safe file stem: `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    /// Parse and validate a run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidRunName`] if the name is empty or contains
    /// characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidRunName { name });
        }
        Ok(Self(name))
    }

    /// Return the run name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_name_valid() {
        let name = RunName::new("verse-chorus_01".to_string()).unwrap();
        assert_eq!(name.as_str(), "verse-chorus_01");
        assert_eq!(name.to_string(), "verse-chorus_01");
    }

    #[test]
    fn run_name_rejects_empty() {
        assert!(matches!(
            RunName::new(String::new()),
            Err(IoError::InvalidRunName { .. })
        ));
    }

    #[test]
    fn run_name_rejects_path_separators() {
        assert!(matches!(
            RunName::new("../song".to_string()),
            Err(IoError::InvalidRunName { .. })
        ));
    }
}
