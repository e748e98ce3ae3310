//! Minimal single-font PDF 1.4 writer: text lines only, Helvetica and
//! Helvetica-Bold with WinAnsi encoding, A4 pages.

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const TITLE_SIZE: f32 = 16.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const WRAP_COLUMNS: usize = 95;

// Catalog, page tree and both fonts come before the page objects.
const FIRST_PAGE_OBJECT: usize = 5;

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug)]
pub struct PdfDocument {
    pages: Vec<Vec<String>>,
    current: Vec<String>,
    cursor: f32,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    pub fn title(&mut self, text: &str) {
        self.write_line(text, Font::Bold, TITLE_SIZE);
        self.gap();
    }

    pub fn heading(&mut self, text: &str) {
        self.gap();
        self.write_line(text, Font::Bold, HEADING_SIZE);
    }

    /// Body text, wrapped to the page width.
    pub fn text(&mut self, text: &str) {
        for line in wrap(text, WRAP_COLUMNS) {
            self.write_line(&line, Font::Regular, BODY_SIZE);
        }
    }

    pub fn gap(&mut self) {
        self.cursor -= BODY_SIZE * 0.6;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.current.is_empty() || self.pages.is_empty())
    }

    fn write_line(&mut self, text: &str, font: Font, size: f32) {
        let leading = size * 1.4;
        if self.cursor - leading < MARGIN {
            self.pages.push(std::mem::take(&mut self.current));
            self.cursor = PAGE_HEIGHT - MARGIN;
        }
        self.cursor -= leading;
        self.current.push(format!(
            "BT /{} {size} Tf {MARGIN} {:.1} Td ({}) Tj ET",
            font.resource(),
            self.cursor,
            escape_text(text)
        ));
    }

    pub fn finish(mut self) -> Vec<u8> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }

        let kids = (0..self.pages.len())
            .map(|index| format!("{} 0 R", FIRST_PAGE_OBJECT + index * 2))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", self.pages.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>".to_string(),
        ];
        for (index, page) in self.pages.iter().enumerate() {
            let content_object = FIRST_PAGE_OBJECT + index * 2 + 1;
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_object} 0 R >>"
            ));
            let stream = page.join("\n");
            objects.push(format!("<< /Length {} >>\nstream\n{stream}\nendstream", stream.len()));
        }

        // Everything written is ASCII, so string offsets are byte offsets.
        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", index + 1));
        }

        let xref_offset = out.len();
        out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
        for offset in offsets {
            out.push_str(&format!("{offset:010} 00000 n \n"));
        }
        out.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        out.into_bytes()
    }
}

/// Escape a string for a PDF literal. Latin-1 characters become octal
/// WinAnsi codes; anything outside that range is replaced with '?'.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            '\t' => escaped.push(' '),
            '\u{a0}'..='\u{ff}' => escaped.push_str(&format!("\\{:03o}", c as u32)),
            _ => escaped.push('?'),
        }
    }
    escaped
}

fn wrap(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > columns {
            if line_len > 0 {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            let rest = word.split_off(columns);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        if line_len > 0 && line_len + 1 + word.len() > columns {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line_len += word.len();
        line.extend(word);
    }

    if line_len > 0 || lines.is_empty() {
        lines.push(line);
    }
    lines
}
