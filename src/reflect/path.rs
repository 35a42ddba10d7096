use std::{convert::Infallible, fmt, str::FromStr};

/// The location of a field relative to the object that owns it, written as
/// a sequence of field names (`.a.b`). The empty path refers to the object
/// itself.
///
/// ```
/// use graph_injector::StructPath;
///
/// let path = StructPath::empty().branch("config").branch("port");
/// assert_eq!(".config.port", path.to_string());
///
/// let (head, rest) = path.shift();
/// assert_eq!("config", head);
/// assert_eq!(".port", rest.to_string());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructPath {
    segments: Vec<String>,
}

impl StructPath {
    #[must_use]
    pub fn empty() -> Self {
        StructPath::default()
    }

    /// Creates a new path with `name` appended. The original path is left
    /// unchanged.
    #[must_use]
    pub fn branch(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_owned());
        StructPath { segments }
    }

    /// Splits off the first segment. Shifting an empty path yields an empty
    /// segment and an empty path.
    #[must_use]
    pub fn shift(&self) -> (String, Self) {
        match self.segments.split_first() {
            Some((head, rest)) => (
                head.clone(),
                StructPath {
                    segments: rest.to_vec(),
                },
            ),
            None => (String::new(), StructPath::empty()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for StructPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }

        Ok(())
    }
}

impl FromStr for StructPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(StructPath::from(s))
    }
}

impl From<&str> for StructPath {
    fn from(path: &str) -> Self {
        StructPath {
            segments: path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::StructPath;

    #[test]
    fn empty_path_prints_nothing() {
        let path = StructPath::empty();
        assert!(path.is_empty());
        assert_eq!("", path.to_string());
    }

    #[test]
    fn branch_leaves_original_untouched() {
        let parent = StructPath::from(".a");
        let child = parent.branch("b");

        assert_eq!(".a", parent.to_string());
        assert_eq!(".a.b", child.to_string());
        assert_eq!(&["a".to_owned(), "b".to_owned()], child.segments());
    }

    #[test]
    fn shift_walks_every_segment() {
        let path: StructPath = ".a.b.c".parse().unwrap();

        let (head, path) = path.shift();
        assert_eq!("a", head);
        assert_eq!(".b.c", path.to_string());

        let (head, path) = path.shift();
        assert_eq!("b", head);
        let (head, path) = path.shift();
        assert_eq!("c", head);
        assert!(path.is_empty());

        let (head, path) = path.shift();
        assert_eq!("", head);
        assert!(path.is_empty());
    }

    #[test]
    fn leading_dot_is_optional() {
        assert_eq!(StructPath::from("a.b"), StructPath::from(".a.b"));
    }
}
