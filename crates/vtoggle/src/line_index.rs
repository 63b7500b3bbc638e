use serde::Serialize;

/// Zero-based line and UTF-16 column, as used on the wire by LSP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct LinePosition {
    pub line: u32,
    pub character: u32,
}

impl LinePosition {
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Converts between byte offsets and line/column positions of one text.
#[derive(Debug, Clone)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    /// Byte offset of `position`. Lines past the end clamp to the end of the
    /// text, columns past the end of a line clamp to the line break.
    pub fn offset_at(&self, position: LinePosition) -> usize {
        let Some(&line_start) = self.line_starts.get(position.line as usize) else {
            return self.text.len();
        };
        let line_end = self
            .line_starts
            .get(position.line as usize + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let line = &self.text[line_start..line_end];
        let line = line.strip_suffix('\r').unwrap_or(line);

        let mut units = 0u32;
        for (idx, ch) in line.char_indices() {
            if units >= position.character {
                return line_start + idx;
            }
            units += ch.len_utf16() as u32;
        }
        line_start + line.len()
    }

    /// Position of byte `offset`. Offsets past the end (or inside a
    /// multi-byte character) snap back to the nearest character boundary.
    pub fn position_at(&self, offset: usize) -> LinePosition {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let character = self.text[line_start..offset]
            .chars()
            .map(|ch| ch.len_utf16() as u32)
            .sum();
        LinePosition::new(line as u32, character)
    }
}
