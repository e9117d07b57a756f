//! Minimal PDF 1.4 writer for plan exports.
//!
//! Uses the standard Helvetica faces with WinAnsi encoding, so no font
//! embedding is needed. Line breaking relies on an average glyph width
//! rather than per-glyph metrics; plan text is short prose and a small
//! overshoot only shortens a line.

use std::io::Write;

use bytes::Bytes;
use serde_json::Value;

use crate::models::plan::ChecklistResult;
use crate::render::document::{outline, Block};
use crate::render::{PlanRenderer, RenderError};

// ────────────────────────────────────────────────────────────────────────────
// Page layout
// ────────────────────────────────────────────────────────────────────────────

/// Page geometry in PDF points (1/72 in).
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
    pub font_size_pt: f32,
    pub title_size_pt: f32,
    pub leading_pt: f32,
    /// Average Helvetica advance width, in em.
    pub avg_char_em: f32,
}

impl PageLayout {
    /// A4 portrait, 2 cm margins, 11pt body.
    pub fn a4() -> Self {
        Self {
            width_pt: 595.0,
            height_pt: 842.0,
            margin_pt: 56.0,
            font_size_pt: 11.0,
            title_size_pt: 16.0,
            leading_pt: 15.0,
            avg_char_em: 0.5,
        }
    }

    pub fn chars_per_line(&self) -> usize {
        let text_width = self.width_pt - 2.0 * self.margin_pt;
        (text_width / (self.font_size_pt * self.avg_char_em)).floor().max(0.0) as usize
    }

    pub fn lines_per_page(&self) -> usize {
        let text_height = self.height_pt - 2.0 * self.margin_pt;
        (text_height / self.leading_pt).floor().max(0.0) as usize
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Regular,
    Bold,
}

#[derive(Debug, Clone)]
struct Line {
    face: Face,
    size: f32,
    indent: f32,
    text: String,
}

/// Greedy word wrap to `width` characters. Words longer than a line are
/// split hard.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn layout_lines(blocks: &[Block], layout: &PageLayout) -> Vec<Line> {
    let width = layout.chars_per_line();
    let bullet_indent = 14.0;
    let mut lines = Vec::new();

    for block in blocks {
        match block {
            Block::Title(text) => lines.push(Line {
                face: Face::Bold,
                size: layout.title_size_pt,
                indent: 0.0,
                text: text.clone(),
            }),
            Block::Heading(text) => lines.push(Line {
                face: Face::Bold,
                size: layout.font_size_pt,
                indent: 0.0,
                text: text.clone(),
            }),
            Block::Paragraph(text) => {
                lines.extend(wrap(text, width).into_iter().map(|text| Line {
                    face: Face::Regular,
                    size: layout.font_size_pt,
                    indent: 0.0,
                    text,
                }));
            }
            Block::Bullet(text) => {
                let wrapped = wrap(text, width.saturating_sub(3));
                for (i, text) in wrapped.into_iter().enumerate() {
                    let (indent, text) = if i == 0 {
                        (0.0, format!("- {text}"))
                    } else {
                        (bullet_indent, text)
                    };
                    lines.push(Line {
                        face: Face::Regular,
                        size: layout.font_size_pt,
                        indent,
                        text,
                    });
                }
            }
            Block::Spacer => lines.push(Line {
                face: Face::Regular,
                size: layout.font_size_pt,
                indent: 0.0,
                text: String::new(),
            }),
        }
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Maps a char to its WinAnsiEncoding byte. Unmappable chars become `?`.
fn win_ansi(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7e}' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        'Œ' => 0x8c,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        'œ' => 0x9c,
        'Ÿ' => 0x9f,
        '\u{202f}' => 0xa0,
        _ => b'?',
    }
}

/// Encodes text as the body of a PDF literal string.
fn pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for byte in text.chars().map(win_ansi) {
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Document assembly
// ────────────────────────────────────────────────────────────────────────────

fn page_stream(lines: &[Line], layout: &PageLayout) -> Result<Vec<u8>, RenderError> {
    let mut stream = Vec::new();
    let mut y = layout.height_pt - layout.margin_pt - layout.title_size_pt;
    for line in lines {
        if !line.text.is_empty() {
            let font = match line.face {
                Face::Regular => "F1",
                Face::Bold => "F2",
            };
            write!(
                stream,
                "BT /{font} {:.1} Tf {:.2} {:.2} Td (",
                line.size,
                layout.margin_pt + line.indent,
                y
            )?;
            stream.extend_from_slice(&pdf_string(&line.text));
            stream.extend_from_slice(b") Tj ET\n");
        }
        y -= layout.leading_pt;
    }
    Ok(stream)
}

/// Serialises numbered objects and the cross-reference table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: usize, body: &[u8]) -> Result<(), RenderError> {
        if self.offsets.len() < id {
            self.offsets.resize(id, 0);
        }
        self.offsets[id - 1] = self.buf.len();
        writeln!(self.buf, "{id} 0 obj")?;
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
        Ok(())
    }

    fn stream(&mut self, id: usize, content: &[u8]) -> Result<(), RenderError> {
        let mut body = Vec::with_capacity(content.len() + 64);
        write!(body, "<< /Length {} >>\nstream\n", content.len())?;
        body.extend_from_slice(content);
        body.extend_from_slice(b"\nendstream");
        self.object(id, &body)
    }

    fn finish(mut self, root: usize) -> Result<Vec<u8>, RenderError> {
        let xref = self.buf.len();
        let count = self.offsets.len() + 1;
        write!(self.buf, "xref\n0 {count}\n0000000000 65535 f \n")?;
        for offset in &self.offsets {
            write!(self.buf, "{offset:010} 00000 n \n")?;
        }
        write!(
            self.buf,
            "trailer\n<< /Size {count} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n"
        )?;
        Ok(self.buf)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    layout: PageLayout,
}

impl PdfRenderer {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }

    fn write_document(&self, lines: &[Line]) -> Result<Vec<u8>, RenderError> {
        let per_page = self.layout.lines_per_page();
        if per_page == 0 || self.layout.chars_per_line() == 0 {
            return Err(RenderError::Layout);
        }
        let pages: Vec<&[Line]> = if lines.is_empty() {
            vec![lines]
        } else {
            lines.chunks(per_page).collect()
        };

        // 1 catalog, 2 page tree, 3-4 fonts, then (page, content) pairs.
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 5 + 2 * i).collect();
        let mut pdf = PdfWriter::new();

        pdf.object(1, b"<< /Type /Catalog /Pages 2 0 R >>")?;
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");
        pdf.object(
            2,
            format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).as_bytes(),
        )?;
        pdf.object(
            3,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        )?;
        pdf.object(
            4,
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        )?;

        for (page, page_id) in pages.iter().zip(&page_ids) {
            let content_id = page_id + 1;
            pdf.object(
                *page_id,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.0} {:.0}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_id} 0 R >>",
                    self.layout.width_pt, self.layout.height_pt
                )
                .as_bytes(),
            )?;
            pdf.stream(content_id, &page_stream(page, &self.layout)?)?;
        }

        pdf.finish(1)
    }
}

impl PlanRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(
        &self,
        plan_json: &Value,
        checklist: Option<&ChecklistResult>,
    ) -> Result<Bytes, RenderError> {
        let blocks = outline(plan_json, checklist);
        let lines = layout_lines(&blocks, &self.layout);
        Ok(Bytes::from(self.write_document(&lines)?))
    }
}
