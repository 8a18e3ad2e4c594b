//! Standard Type1 Times fonts: metrics and WinAnsi encoding.
//!
//! Only the base-14 fonts are used so nothing has to be embedded. Widths are
//! the Adobe AFM advance widths (1/1000 em) for printable ASCII.

use encoding_rs::WINDOWS_1252;

/// Font faces available on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Resource name inside the page `Font` dictionary.
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }

    /// PostScript base font name.
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Times-Roman",
            Font::Bold => "Times-Bold",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            Font::Regular => &TIMES_ROMAN_WIDTHS,
            Font::Bold => &TIMES_BOLD_WIDTHS,
        }
    }

    /// Advance width of a single character in 1/1000 em.
    pub fn char_width(&self, c: char) -> u16 {
        let code = c as u32;
        if (32..=126).contains(&code) {
            return self.widths()[(code - 32) as usize];
        }
        // Accented Latin letters share the width of their base letter closely
        // enough for wrapping purposes.
        match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => self.char_width('a'),
            'é' | 'è' | 'ë' | 'ê' => self.char_width('e'),
            'í' | 'ì' | 'ï' | 'î' => self.char_width('i'),
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => self.char_width('o'),
            'ú' | 'ù' | 'ü' | 'û' => self.char_width('u'),
            'ñ' => self.char_width('n'),
            'Á' | 'À' | 'Ä' | 'Â' | 'Ã' => self.char_width('A'),
            'É' | 'È' | 'Ë' | 'Ê' => self.char_width('E'),
            'Í' | 'Ì' | 'Ï' | 'Î' => self.char_width('I'),
            'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => self.char_width('O'),
            'Ú' | 'Ù' | 'Ü' | 'Û' => self.char_width('U'),
            'Ñ' => self.char_width('N'),
            _ => 500,
        }
    }

    /// Width of `text` in points at `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }
}

/// Encode text for a WinAnsiEncoding font. Characters outside the code page
/// come out as numeric character references.
pub fn encode_text(text: &str) -> Vec<u8> {
    let (bytes, _, _) = WINDOWS_1252.encode(text);
    bytes.into_owned()
}

/// Inverse of [`encode_text`], used when reading rendered documents back.
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text.into_owned()
}

#[rustfmt::skip]
const TIMES_ROMAN_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_WIDTHS: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];
