//! Running page cursor over a multi-page lopdf document.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use tracing::trace;

use super::Result;
use super::fonts::{Font, encode_text};
use crate::error::RenderError;
use crate::models::RenderConfig;

/// Extra leading added to the font size for free-flowing lines.
pub const LINE_GAP: f32 = 2.0;

/// Font face and size for a run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
}

impl TextStyle {
    pub fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    pub fn font(&self) -> Font {
        if self.bold { Font::Bold } else { Font::Regular }
    }
}

/// An RGB fill colour with 0-255 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn operands(&self) -> Vec<Object> {
        [self.0, self.1, self.2]
            .iter()
            .map(|c| Object::Real(f32::from(*c) / 255.0))
            .collect()
    }
}

/// Vertical cursor that wraps text to the content width and starts a new page
/// whenever the next block would cross the bottom margin.
///
/// Coordinates passed in and out are measured from the top of the page; the
/// flip to PDF user space happens when operations are emitted.
pub struct PageCursor {
    config: RenderConfig,
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl PageCursor {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            config: config.clone(),
            finished: Vec::new(),
            current: Vec::new(),
            y: config.margin,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Current distance from the top edge.
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    pub fn left(&self) -> f32 {
        self.config.margin
    }

    pub fn top(&self) -> f32 {
        self.config.margin
    }

    pub fn bottom(&self) -> f32 {
        self.config.page_height - self.config.margin
    }

    pub fn content_width(&self) -> f32 {
        self.config.page_width - self.config.margin * 2.0
    }

    /// Number of pages started so far, including the current one.
    pub fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    pub fn at_page_top(&self) -> bool {
        self.y <= self.top()
    }

    /// Close the current page and move the cursor to the top of a fresh one.
    pub fn new_page(&mut self) {
        let ops = std::mem::take(&mut self.current);
        self.finished.push(ops);
        self.y = self.top();
        trace!("Started page {}", self.page_count());
    }

    /// Break the page unless `height` more points fit above the bottom margin.
    ///
    /// Returns `true` when a new page was started. A block that is taller than
    /// a whole page is left to overflow rather than looping forever.
    pub fn ensure(&mut self, height: f32) -> bool {
        if self.y + height > self.bottom() && !self.at_page_top() {
            self.new_page();
            return true;
        }
        false
    }

    /// Vertical gap.
    pub fn space(&mut self, amount: f32) {
        self.y += amount;
    }

    /// Wrapped text starting at the left margin. Line height is size + 2.
    pub fn line(&mut self, text: &str, style: TextStyle) {
        let line_height = style.size + LINE_GAP;
        for line in wrap_text(text, style.font(), style.size, self.content_width()) {
            self.ensure(line_height);
            let (x, y) = (self.left(), self.y);
            self.text_at(x, y, &line, style);
            self.y += line_height;
        }
    }

    /// Draw a single unwrapped run whose em box starts at `top`.
    pub fn text_at(&mut self, x: f32, top: f32, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        let baseline = self.config.page_height - (top + style.size);
        let font = style.font();
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.resource_name().as_bytes().to_vec()), Object::Real(style.size)],
            ),
            Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_text(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    /// Filled rectangle whose top-left corner is at (`x`, `top`).
    pub fn fill_rect(&mut self, x: f32, top: f32, width: f32, height: f32, colour: Rgb) {
        let bottom = self.config.page_height - (top + height);
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", colour.operands()),
            Operation::new(
                "re",
                vec![Object::Real(x), Object::Real(bottom), Object::Real(width), Object::Real(height)],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Thin horizontal rule.
    pub fn rule(&mut self, x: f32, y: f32, width: f32, colour: Rgb) {
        let pdf_y = self.config.page_height - y;
        self.current.extend([
            Operation::new("q", vec![]),
            Operation::new("w", vec![Object::Real(0.5)]),
            Operation::new("RG", colour.operands()),
            Operation::new("m", vec![Object::Real(x), Object::Real(pdf_y)]),
            Operation::new("l", vec![Object::Real(x + width), Object::Real(pdf_y)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Assemble all pages into a serialized PDF.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let last = std::mem::take(&mut self.current);
        self.finished.push(last);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(Font::Regular));
        let bold_id = doc.add_object(font_dictionary(Font::Bold));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource_name() => regular_id,
                Font::Bold.resource_name() => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.finished.len());
        for operations in self.finished {
            let encoded = Content { operations }.encode().map_err(pdf_error)?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.config.page_width),
                Object::Real(self.config.page_height),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(pdf_error)?;
        Ok(bytes)
    }
}

fn font_dictionary(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

/// Greedy word wrap to `max_width` points.
///
/// Explicit newlines always break. A word wider than the whole line is split
/// between characters. Blank paragraphs are kept as empty lines.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let space = font.text_width(" ", size);

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0;

        for word in paragraph.split_whitespace() {
            let word_width = font.text_width(word, size);

            if word_width > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let mut pieces = break_word(word, font, size, max_width);
                let tail = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                current_width = font.text_width(&tail, size);
                current = tail;
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + space + word_width <= max_width {
                current.push(' ');
                current.push_str(word);
                current_width += space + word_width;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
                current_width = word_width;
            }
        }

        lines.push(current);
    }

    lines
}

fn break_word(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0;

    for c in word.chars() {
        let w = f32::from(font.char_width(c)) * size / 1000.0;
        if width + w > max_width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    pieces.push(piece);
    pieces
}
