use serde::Serialize;

/// Half-open byte interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn is_inverted(&self) -> bool {
        self.end < self.start
    }

    /// True when `other` lies entirely inside `self` (bounds inclusive).
    pub fn contains_span(&self, other: Span) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// True when `other` ends before `self` starts or starts after `self` ends.
    /// Touching endpoints do not count as disjoint.
    pub fn is_disjoint(&self, other: Span) -> bool {
        other.end < self.start || other.start > self.end
    }

    pub fn offset_by(&self, delta: usize) -> Span {
        Span::new(self.start + delta, self.end + delta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(code: &str, message: impl Into<String>, span: Span) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            span,
        }
    }
}

pub fn render_diagnostics(path: &str, diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }
        output.push_str(&format!(
            "error[{}] {}:{}..{} {}",
            diagnostic.code, path, diagnostic.span.start, diagnostic.span.end, diagnostic.message
        ));
    }
    output
}
