//! Tables with a filled header row, wrapped cells and page breaks.

use super::page::{PageCursor, Rgb, TextStyle, wrap_text};

/// Header background.
pub const HEADER_FILL: Rgb = Rgb(241, 233, 220);

/// Separator drawn under each body row.
const ROW_RULE: Rgb = Rgb(220, 220, 220);

/// Gap left below a table before the next block.
pub const TABLE_GAP: f32 = 10.0;

/// Cell line height relative to the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Narrowest a column is squeezed to when fixed widths leave no room.
const MIN_COLUMN_WIDTH: f32 = 24.0;

/// Builder for a single table drawn through a [`PageCursor`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    head: Vec<String>,
    rows: Vec<Vec<String>>,
    widths: Vec<Option<f32>>,
    font_size: Option<f32>,
    cell_padding: f32,
}

impl TableBuilder {
    pub fn new<S: AsRef<str>>(head: &[S]) -> Self {
        Self {
            head: head.iter().map(|h| h.as_ref().to_string()).collect(),
            rows: Vec::new(),
            widths: vec![None; head.len()],
            font_size: None,
            cell_padding: 4.0,
        }
    }

    /// Append a body row. Missing cells are blank, extra cells are dropped.
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        row.resize(self.head.len(), String::new());
        self.rows.push(row);
        self
    }

    /// Fix the width of column `index`; other columns share the remainder.
    pub fn column_width(mut self, index: usize, width: f32) -> Self {
        if let Some(slot) = self.widths.get_mut(index) {
            *slot = Some(width);
        }
        self
    }

    /// Override the configured table font size.
    pub fn font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn cell_padding(mut self, padding: f32) -> Self {
        self.cell_padding = padding;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Draw at the cursor and leave it [`TABLE_GAP`] below the last row.
    ///
    /// When a row does not fit, a new page is started and the header is
    /// repeated before the row.
    pub fn draw(self, cursor: &mut PageCursor) {
        let size = self
            .font_size
            .unwrap_or(cursor.config().table_font_size);
        let widths = self.resolve_widths(cursor.content_width(), size);

        let head_style = TextStyle::bold(size);
        let body_style = TextStyle::regular(size);
        let header = self.layout_row(&self.head, &widths, head_style);

        let first_height = self
            .rows
            .first()
            .map(|row| self.layout_row(row, &widths, body_style).height)
            .unwrap_or(0.0);
        cursor.ensure(header.height + first_height);
        self.draw_row(cursor, &header, &widths, head_style, Some(HEADER_FILL));

        for row in &self.rows {
            let laid_out = self.layout_row(row, &widths, body_style);
            if cursor.ensure(laid_out.height) {
                self.draw_row(cursor, &header, &widths, head_style, Some(HEADER_FILL));
            }
            self.draw_row(cursor, &laid_out, &widths, body_style, None);
        }

        cursor.space(TABLE_GAP);
    }

    fn line_height(size: f32) -> f32 {
        size * LINE_HEIGHT_FACTOR
    }

    /// Fixed columns keep their width. Auto columns split what is left in
    /// proportion to their widest cell.
    fn resolve_widths(&self, available: f32, size: f32) -> Vec<f32> {
        let fixed: f32 = self.widths.iter().flatten().sum();
        let remaining = (available - fixed).max(0.0);

        let natural: Vec<f32> = (0..self.head.len())
            .map(|col| {
                let head = TextStyle::bold(size).font().text_width(&self.head[col], size);
                let body = self
                    .rows
                    .iter()
                    .flat_map(|row| row[col].split('\n'))
                    .map(|text| TextStyle::regular(size).font().text_width(text, size))
                    .fold(0.0_f32, f32::max);
                head.max(body) + self.cell_padding * 2.0
            })
            .collect();

        let auto_total: f32 = self
            .widths
            .iter()
            .zip(&natural)
            .filter(|(fixed, _)| fixed.is_none())
            .map(|(_, n)| *n)
            .sum();

        self.widths
            .iter()
            .zip(&natural)
            .map(|(fixed, natural)| match fixed {
                Some(width) => *width,
                None if auto_total > 0.0 => (remaining * natural / auto_total).max(MIN_COLUMN_WIDTH),
                None => MIN_COLUMN_WIDTH,
            })
            .collect()
    }

    fn layout_row(&self, cells: &[String], widths: &[f32], style: TextStyle) -> LaidOutRow {
        let inner: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(text, width)| {
                let max = (width - self.cell_padding * 2.0).max(1.0);
                wrap_text(text, style.font(), style.size, max)
            })
            .collect();
        let max_lines = inner.iter().map(Vec::len).max().unwrap_or(1).max(1);
        let height = max_lines as f32 * Self::line_height(style.size) + self.cell_padding * 2.0;
        LaidOutRow { cells: inner, height }
    }

    fn draw_row(
        &self,
        cursor: &mut PageCursor,
        row: &LaidOutRow,
        widths: &[f32],
        style: TextStyle,
        fill: Option<Rgb>,
    ) {
        let top = cursor.y();
        let left = cursor.left();
        let total_width: f32 = widths.iter().sum();

        if let Some(colour) = fill {
            cursor.fill_rect(left, top, total_width, row.height, colour);
        }

        let mut x = left;
        for (lines, width) in row.cells.iter().zip(widths) {
            for (i, line) in lines.iter().enumerate() {
                let line_top = top + self.cell_padding + i as f32 * Self::line_height(style.size);
                cursor.text_at(x + self.cell_padding, line_top, line, style);
            }
            x += width;
        }

        if fill.is_none() {
            cursor.rule(left, top + row.height, total_width, ROW_RULE);
        }
        cursor.set_y(top + row.height);
    }
}

struct LaidOutRow {
    cells: Vec<Vec<String>>,
    height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenderConfig;

    #[test]
    fn test_fixed_widths_are_kept() {
        let table = TableBuilder::new(&["Campo", "Valor"])
            .column_width(0, 200.0)
            .column_width(1, 320.0)
            .row(["Folio Fiscal UUID", "ABC"]);
        assert_eq!(table.resolve_widths(540.0, 8.0), vec![200.0, 320.0]);
    }

    #[test]
    fn test_auto_widths_fill_remaining_space() {
        let table = TableBuilder::new(&["Tipo", "Impuesto", "Factor", "Tasa", "Base", "Importe"])
            .column_width(0, 70.0)
            .column_width(1, 60.0)
            .column_width(2, 60.0)
            .column_width(3, 60.0)
            .row(["Traslado", "002", "Tasa", "0.160000", "100.00", "16.00"]);
        let widths = table.resolve_widths(540.0, 8.0);
        let total: f32 = widths.iter().sum();
        assert!((total - 540.0).abs() < 0.01);
    }

    #[test]
    fn test_draw_advances_past_table() {
        let mut cursor = PageCursor::new(&RenderConfig::default());
        TableBuilder::new(&["Comprobante", ""])
            .row(["Serie", "A"])
            .row(["Folio", "1"])
            .draw(&mut cursor);

        // Three rows of 8 * 1.15 + 8 padding each, then the gap.
        let expected = 36.0 + 3.0 * (8.0 * 1.15 + 8.0) + TABLE_GAP;
        assert!((cursor.y() - expected).abs() < 0.01);
    }

    #[test]
    fn test_long_table_paginates() {
        let mut table = TableBuilder::new(&["Tipo", "Clave", "Concepto", "Importe"]);
        for i in 0..80 {
            table = table.row(["001", "P001", format!("Concepto {}", i).as_str(), "100.00"]);
        }
        let mut cursor = PageCursor::new(&RenderConfig::default());
        table.draw(&mut cursor);
        assert!(cursor.page_count() >= 2);
        assert!(cursor.y() < cursor.bottom() + TABLE_GAP);
    }

    #[test]
    fn test_multiline_cell_sets_row_height() {
        let table = TableBuilder::new(&["Emisor", "Receptor"])
            .cell_padding(6.0)
            .row(["ACME\nRFC: AAA010101AAA", "Cliente"]);
        let widths = table.resolve_widths(540.0, 9.0);
        let row = table.layout_row(&table.rows[0], &widths, TextStyle::regular(9.0));
        assert!((row.height - (2.0 * 9.0 * 1.15 + 12.0)).abs() < 0.01);
    }
}
