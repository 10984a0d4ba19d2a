use std::path::PathBuf;

pub type Span = std::ops::Range<usize>;

#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub span: Span,
    pub path: PathBuf,
}
impl Location {
    pub fn new(span: Span, path: PathBuf) -> Self {
        Self { span, path }
    }

    pub fn internal() -> Self {
        Self {
            span: Span { start: 0, end: 0 },
            path: PathBuf::from("internal"),
        }
    }
}
impl Default for Location {
    fn default() -> Self {
        Self {
            span: 0..0,
            path: PathBuf::new(),
        }
    }
}

impl ariadne::Span for Location {
    type SourceId = PathBuf;

    fn source(&self) -> &Self::SourceId {
        &self.path
    }

    fn start(&self) -> usize {
        self.span.start
    }

    fn end(&self) -> usize {
        self.span.end
    }
}

/// Maps between byte offsets and 1-based (line, column) positions of a source text.
/// Columns count characters, not bytes.
#[derive(Clone, Debug)]
pub struct LineIndex<'a> {
    src: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(src: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { src, line_starts }
    }

    pub fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(l) => l,
            Err(l) => l - 1,
        };
        let start = self.line_starts[line];
        let column = self.src[start..offset.min(self.src.len())].chars().count();
        (line + 1, column + 1)
    }

    /// Returns the byte offset of a position. Positions past the end clamp to the
    /// source length.
    pub fn offset(&self, line: usize, column: usize) -> usize {
        let Some(&start) = self.line_starts.get(line.saturating_sub(1)) else {
            return self.src.len();
        };
        self.src[start..]
            .char_indices()
            .nth(column.saturating_sub(1))
            .map_or(self.src.len(), |(i, _)| start + i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_and_offset_agree() {
        let src = "SELECT 1;\n  -- é\nSELECT 2";
        let index = LineIndex::new(src);
        assert_eq!(index.position(0), (1, 1));
        assert_eq!(index.position(12), (2, 3));
        let pos_of_select = src.rfind("SELECT").unwrap();
        assert_eq!(index.position(pos_of_select), (3, 1));
        assert_eq!(index.offset(3, 1), pos_of_select);
        assert_eq!(index.offset(2, 3), 12);
        assert_eq!(index.offset(9, 1), src.len());
    }
}
