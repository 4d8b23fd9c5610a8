// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rendering -- persist a received job's text content as a PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by
// constructing `PdfPage` structs containing `Vec<Op>` operation lists,
// then serialised via `PdfDocument::save()`.

use std::path::Path;

use printpdf::{
    BuiltinFont, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info};

use jetspool_core::error::Result;

/// A4 page dimensions in millimetres.
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

/// Renders text content into simple paginated PDF documents.
///
/// The layout is a plain top-to-bottom flow in the built-in Helvetica
/// font -- good enough to make any spooled job readable and archivable,
/// with no fidelity guarantees.
pub struct PdfRenderer {
    /// Title embedded in the PDF /Info dictionary.
    title: Option<String>,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self { title: None }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Render plain text into PDF bytes.
    ///
    /// Long lines are wrapped at an estimated character width and pages
    /// break automatically.
    pub fn render_text(&self, text: &str) -> Result<Vec<u8>> {
        let page_w = Mm(PAGE_WIDTH_MM);
        let page_h = Mm(PAGE_HEIGHT_MM);
        let title = self.title.as_deref().unwrap_or("Jetspool Document");

        info!(title, text_len = text.len(), "rendering text PDF");

        let font_size_pt: f32 = 11.0;
        let line_height_pt: f32 = 14.0;
        let margin_mm: f32 = 20.0;
        let margin_pt: f32 = Mm(margin_mm).into_pt().0;
        let usable_width_mm = page_w.0 - 2.0 * margin_mm;

        // Approximate characters per line based on Helvetica at 11pt.
        // Average Helvetica glyph width is roughly 0.50 * font_size in pt,
        // converted to mm (1pt = 0.3528mm).
        let avg_char_width_mm: f32 = 0.50 * font_size_pt * 0.3528;
        let max_chars_per_line = (usable_width_mm / avg_char_width_mm) as usize;

        let wrapped_lines = wrap_text(text, max_chars_per_line);
        let page_h_pt = page_h.into_pt().0;
        let usable_height_pt = page_h_pt - 2.0 * margin_pt;
        let lines_per_page = (usable_height_pt / line_height_pt) as usize;

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::new();

        // Process lines in chunks of `lines_per_page`.
        let mut line_iter = wrapped_lines.iter().peekable();
        while line_iter.peek().is_some() {
            let mut ops: Vec<Op> = Vec::new();

            let mut line_idx: usize = 0;
            while line_idx < lines_per_page {
                let line = match line_iter.next() {
                    Some(l) => l,
                    None => break,
                };

                // Position: top-left of the page, moving downward.
                let y_pt = page_h_pt - margin_pt - (line_idx as f32 * line_height_pt);

                ops.push(Op::StartTextSection);
                ops.push(Op::SetTextCursor {
                    pos: Point {
                        x: Pt(margin_pt),
                        y: Pt(y_pt),
                    },
                });
                ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(font_size_pt),
                    font: BuiltinFont::Helvetica,
                });
                ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(line.clone())],
                    font: BuiltinFont::Helvetica,
                });
                ops.push(Op::EndTextSection);

                line_idx += 1;
            }

            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        // If there were no lines at all, emit a single blank page.
        if pages.is_empty() {
            pages.push(PdfPage::new(page_w, page_h, Vec::new()));
        }

        doc.with_pages(pages);

        debug!(
            total_lines = wrapped_lines.len(),
            pages = doc.pages.len(),
            "text layout complete"
        );

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);

        Ok(output)
    }

    /// Render text and write the PDF directly to a file.
    pub fn write_text_to_file(&self, text: &str, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.render_text(text)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!("wrote text PDF to {}", path.as_ref().display());
        Ok(())
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// -- Text wrapping helper -----------------------------------------------------

/// Wrap a multi-line string so that no line exceeds `max_width` characters.
///
/// Splits on existing newlines first, then performs simple word-wrap within
/// each paragraph. Words longer than `max_width` are force-broken.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.is_empty() {
            result.push(String::new());
            continue;
        }

        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::with_capacity(max_width);

        for word in words {
            if word.len() > max_width {
                if !current_line.is_empty() {
                    result.push(current_line.clone());
                    current_line.clear();
                }
                // Force-break the oversized word.
                let mut remaining = word;
                while remaining.len() > max_width {
                    let (chunk, rest) = remaining.split_at(max_width);
                    result.push(chunk.to_string());
                    remaining = rest;
                }
                if !remaining.is_empty() {
                    current_line.push_str(remaining);
                }
            } else if current_line.is_empty() {
                current_line.push_str(word);
            } else if current_line.len() + 1 + word.len() <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                result.push(current_line.clone());
                current_line.clear();
                current_line.push_str(word);
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_text_is_a_pdf() {
        let renderer = PdfRenderer::new();
        let bytes = renderer.render_text("Hello, printer!").expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_text_still_produces_a_document() {
        let renderer = PdfRenderer::new();
        let bytes = renderer.render_text("").expect("render");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn write_to_file_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.pdf");

        let mut renderer = PdfRenderer::new();
        renderer.set_title("Invoice");
        renderer
            .write_text_to_file("line one\nline two", &path)
            .expect("write");

        let written = std::fs::read(&path).expect("read back");
        assert!(written.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_respects_max_width() {
        let lines = wrap_text("one two three four five six seven", 10);
        assert!(lines.iter().all(|l| l.len() <= 10));
    }

    #[test]
    fn wrap_force_breaks_oversized_words() {
        let lines = wrap_text("abcdefghijklmnop", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ijkl", "mnop"]);
    }

    #[test]
    fn wrap_preserves_blank_lines() {
        let lines = wrap_text("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }
}
