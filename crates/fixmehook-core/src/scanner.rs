use crate::model::FileChange;

/// Marker tokens that flag an added line as a task comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    tokens: Vec<String>,
}

impl Default for MarkerSet {
    fn default() -> Self {
        Self::new(["XXX", "FIXME", "TODO"])
    }
}

impl MarkerSet {
    /// Build a marker set, dropping blank tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .collect();
        Self { tokens }
    }

    /// Parse a comma-separated list such as `XXX,FIXME,TODO`.
    pub fn from_csv(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Case-sensitive substring match. A token only counts when its first
    /// occurrence is past the first byte, which for added lines is the `+`.
    pub fn matches(&self, line: &str) -> bool {
        self.tokens
            .iter()
            .any(|token| line.find(token.as_str()).is_some_and(|idx| idx > 0))
    }
}

/// Finds added lines carrying a marker token in a file's unified diff.
#[derive(Debug, Clone, Default)]
pub struct DiffScanner {
    markers: MarkerSet,
}

impl DiffScanner {
    pub fn new(markers: MarkerSet) -> Self {
        Self { markers }
    }

    /// Raw matching lines, `+` prefix included, in file order. A file
    /// without a patch yields nothing.
    pub fn scan<'a>(&'a self, file: &'a FileChange) -> impl Iterator<Item = &'a str> + 'a {
        file.patch
            .as_deref()
            .into_iter()
            .flat_map(|patch| patch.split('\n'))
            .filter(|line| line.starts_with('+') && line.len() > 1)
            .filter(move |line| self.markers.matches(line))
    }
}
