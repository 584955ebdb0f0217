use std::fmt;

/// Canonical uppercase-alphanumeric form of a scan code, the only shape the
/// lookup endpoint accepts. Camera decodes and manually typed input both go
/// through [`normalize`] so the two surfaces cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedId(String);

impl NormalizedId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduce raw decoded text to canonical form: strip every non-alphanumeric
/// character, uppercase the rest. Returns `None` when nothing alphanumeric
/// remains; such a candidate is discarded, not looked up.
pub fn normalize(raw: &str) -> Option<NormalizedId> {
    let cleaned: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(NormalizedId(cleaned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_and_uppercases() {
        assert_eq!(normalize("RSV-7Q2K9").unwrap().as_str(), "RSV7Q2K9");
        assert_eq!(normalize(" rsv 7q2k9\n").unwrap().as_str(), "RSV7Q2K9");
        assert_eq!(normalize("#396A0C84B8914D2").unwrap().as_str(), "396A0C84B8914D2");
    }

    #[test]
    fn rejects_input_without_alphanumerics() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("  --##  "), None);
    }
}
