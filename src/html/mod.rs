//! Tolerant HTML scanning for the page pipeline.
//!
//! Real-world audit portals ship markup with unclosed tags, arbitrary
//! attribute order, and entity soup, so this is a forgiving single-pass
//! scanner rather than a full DOM: the document is reduced to a flat
//! list of elements and text runs over the original source, each text run
//! knowing its enclosing element. `script` and `style` subtrees are skipped
//! entirely. Parsing never mutates or reflows the source — the report
//! writer re-emits it byte for byte and injects annotations by offset.

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// An element seen in the document, in open-tag order.
#[derive(Debug, Clone)]
pub struct Element {
    /// Tag name, lowercased.
    pub tag: String,
    /// `id` attribute value ("" when absent).
    pub id: String,
    /// `class` attribute value, lowercased ("" when absent).
    pub classes: String,
    /// Byte range of the open tag in the source.
    pub open_span: (usize, usize),
    /// Byte offset just past the element's subtree (after the close tag, or
    /// after the open tag for void/unclosed elements).
    pub end: usize,
}

/// A run of character data between tags.
#[derive(Debug, Clone)]
pub struct TextRun {
    /// Index of the enclosing element, `None` above `<html>` level.
    pub element: Option<usize>,
    /// Byte range in the source.
    pub span: (usize, usize),
}

/// A parsed page: the original source plus element/text indexes into it.
#[derive(Debug)]
pub struct Document {
    source: String,
    elements: Vec<Element>,
    texts: Vec<TextRun>,
}

/// Tags that never take a close tag.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

impl Document {
    /// Parse a page. Never fails — unparseable stretches are treated as text.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut parser = Parser {
            bytes: source.as_bytes(),
            pos: 0,
            elements: Vec::new(),
            texts: Vec::new(),
            stack: Vec::new(),
        };
        parser.run();
        let end = source.len();
        let mut elements = parser.elements;
        let texts = parser.texts;
        // Unclosed elements extend to end of input.
        for idx in parser.stack {
            elements[idx].end = end;
        }
        Self {
            source,
            elements,
            texts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, idx: usize) -> &Element {
        &self.elements[idx]
    }

    pub fn text_runs(&self) -> &[TextRun] {
        &self.texts
    }

    /// Raw (entity-encoded) text of a run.
    pub fn text(&self, run: &TextRun) -> &str {
        &self.source[run.span.0..run.span.1]
    }

    /// All visible text, entity-decoded, whitespace-collapsed. Used for the
    /// compliance-page gate and for page-level evidence scraping.
    pub fn visible_text(&self) -> String {
        let mut out = String::new();
        for run in &self.texts {
            let text = decode_entities(self.text(run));
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(trimmed);
        }
        collapse_whitespace(&out)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    elements: Vec<Element>,
    texts: Vec<TextRun>,
    /// Indices of open elements, innermost last.
    stack: Vec<usize>,
}

impl Parser<'_> {
    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'<' {
                self.handle_tag();
            } else {
                self.handle_text();
            }
        }
    }

    fn handle_text(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'<' {
            self.pos += 1;
        }
        self.texts.push(TextRun {
            element: self.stack.last().copied(),
            span: (start, self.pos),
        });
    }

    fn handle_tag(&mut self) {
        let bytes = self.bytes;
        let rest = &bytes[self.pos..];

        // Comments and declarations carry no text we care about.
        if rest.starts_with(b"<!--") {
            self.pos = find(self.bytes, self.pos + 4, b"-->")
                .map(|p| p + 3)
                .unwrap_or(self.bytes.len());
            return;
        }
        if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
            self.pos = find_byte(self.bytes, self.pos, b'>')
                .map(|p| p + 1)
                .unwrap_or(self.bytes.len());
            return;
        }

        if rest.starts_with(b"</") {
            self.handle_close_tag();
            return;
        }

        // A lone `<` that doesn't start a name is literal text.
        if rest.len() < 2 || !rest[1].is_ascii_alphabetic() {
            let start = self.pos;
            self.pos += 1;
            self.texts.push(TextRun {
                element: self.stack.last().copied(),
                span: (start, self.pos),
            });
            return;
        }

        self.handle_open_tag();
    }

    fn handle_open_tag(&mut self) {
        let start = self.pos;
        self.pos += 1; // past '<'
        let tag = self.read_name();
        let (attrs_end, self_closing) = self.skip_attributes();
        let open_span = (start, attrs_end);

        let mut id = String::new();
        let mut classes = String::new();
        extract_attrs(
            &self.bytes[start..attrs_end],
            &mut id,
            &mut classes,
        );

        let idx = self.elements.len();
        let is_void = VOID_TAGS.contains(&tag.as_str());
        self.elements.push(Element {
            tag: tag.clone(),
            id,
            classes,
            open_span,
            end: attrs_end,
        });

        if self_closing || is_void {
            return;
        }

        // Script/style content is raw text until the matching close tag;
        // never recorded as text runs.
        if tag == "script" || tag == "style" {
            let close = format!("</{tag}");
            let close_pos = find_ci(self.bytes, self.pos, close.as_bytes());
            let after = close_pos
                .and_then(|p| find_byte(self.bytes, p, b'>').map(|g| g + 1))
                .unwrap_or(self.bytes.len());
            self.elements[idx].end = after;
            self.pos = after;
            return;
        }

        self.stack.push(idx);
    }

    fn handle_close_tag(&mut self) {
        self.pos += 2; // past '</'
        let tag = self.read_name();
        let end = find_byte(self.bytes, self.pos, b'>')
            .map(|p| p + 1)
            .unwrap_or(self.bytes.len());

        // Tolerant matching: close the innermost open element with this tag,
        // implicitly ending anything opened inside it.
        if let Some(depth) = self
            .stack
            .iter()
            .rposition(|&idx| self.elements[idx].tag == tag)
        {
            for &idx in &self.stack[depth..] {
                self.elements[idx].end = end;
            }
            self.stack.truncate(depth);
        }
        self.pos = end;
    }

    /// Read an ASCII tag name at the cursor, lowercased.
    fn read_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_alphanumeric() || self.bytes[self.pos] == b'-')
        {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).to_lowercase()
    }

    /// Advance past the attribute list to just after `>`, honoring quotes.
    /// Returns (offset past `>`, saw a trailing `/`).
    fn skip_attributes(&mut self) -> (usize, bool) {
        let mut self_closing = false;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'"' | b'\'' => {
                    let quote = self.bytes[self.pos];
                    self.pos += 1;
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != quote {
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 1).min(self.bytes.len());
                }
                b'>' => {
                    self.pos += 1;
                    return (self.pos, self_closing);
                }
                b'/' => {
                    self_closing = true;
                    self.pos += 1;
                }
                _ => {
                    self_closing = false;
                    self.pos += 1;
                }
            }
        }
        (self.pos, self_closing)
    }
}

/// Pull `id` and `class` attribute values out of a raw open tag.
fn extract_attrs(tag: &[u8], id: &mut String, classes: &mut String) {
    let raw = String::from_utf8_lossy(tag);
    for (name, target) in [("id", id), ("class", classes)] {
        if let Some(value) = attr_value(&raw, name) {
            *target = if name == "class" {
                value.to_lowercase()
            } else {
                value
            };
        }
    }
}

/// Case-insensitive attribute lookup inside an open tag's raw text.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let lower = tag.to_lowercase();
    let bytes = lower.as_bytes();
    let mut search = 0;
    while let Some(found) = lower[search..].find(name) {
        let at = search + found;
        search = at + name.len();
        // Must be a standalone attribute name followed by `=`.
        let before_ok = at == 0 || !bytes[at - 1].is_ascii_alphanumeric();
        let mut i = at + name.len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if !before_ok || i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let (start, end) = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
            let quote = bytes[i];
            let start = i + 1;
            let mut j = start;
            while j < bytes.len() && bytes[j] != quote {
                j += 1;
            }
            (start, j)
        } else {
            let start = i;
            let mut j = i;
            while j < bytes.len()
                && !bytes[j].is_ascii_whitespace()
                && bytes[j] != b'>'
                && bytes[j] != b'/'
            {
                j += 1;
            }
            (start, j)
        };
        // Byte offsets in `lower` match `tag` when lowercasing preserved
        // length (always true for ASCII markup); otherwise keep the lowered
        // slice rather than risk a bad index.
        return Some(if lower.len() == tag.len() {
            tag[start..end].to_string()
        } else {
            lower[start..end].to_string()
        });
    }
    None
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Decode the handful of entities that show up in audit-page prose.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

/// Collapse runs of whitespace to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn find_ci(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
        .map(|p| from + p)
}

fn find_byte(haystack: &[u8], from: usize, byte: u8) -> Option<usize> {
    haystack[from..].iter().position(|&b| b == byte).map(|p| from + p)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
