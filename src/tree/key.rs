use std::fmt;

/// Position of a child inside a composite [`Node`](crate::Node).
///
/// Sequences are addressed by index, mappings by name. [`race`](crate::race) reports
/// its winner with the same key type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Position inside an ordered sequence.
    Index(usize),
    /// Key inside a keyed mapping.
    Name(String),
}

impl Key {
    /// Returns the index for [`Key::Index`].
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    /// Returns the name for [`Key::Name`].
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(name) => Some(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{i}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_the_key_kind() {
        let index = Key::from(2);
        let name = Key::from("primary");

        assert_eq!(index.as_index(), Some(2));
        assert_eq!(index.as_name(), None);
        assert_eq!(name.as_index(), None);
        assert_eq!(name.as_name(), Some("primary"));
        assert_eq!(format!("{index}/{name}"), "2/primary");
    }
}
