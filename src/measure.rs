use crate::model::{Column, Table};
use unicode_width::UnicodeWidthStr;

/// Box metrics of table nodes on the canvas.
pub struct CanvasMetrics {
    pub min_table_width: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub header_char_width: f64,
    pub char_width: f64,
    pub type_char_width: f64,
    pub padding_x: f64,
    pub icon_width: f64,
    pub gap: f64,
    /// Distance between a connector label baseline and the higher endpoint.
    pub label_offset: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Default for CanvasMetrics {
    fn default() -> Self {
        Self {
            min_table_width: 220.0,
            header_height: 36.0,
            row_height: 28.0,
            header_char_width: 8.4,
            char_width: 7.2,
            type_char_width: 6.0,
            padding_x: 12.0,
            icon_width: 16.0,
            gap: 8.0,
            label_offset: 8.0,
            canvas_width: 2000.0,
            canvas_height: 1500.0,
        }
    }
}

impl CanvasMetrics {
    pub fn text_width(&self, text: &str, char_width: f64) -> f64 {
        UnicodeWidthStr::width(text) as f64 * char_width
    }

    /// Header grip, gap and name.
    fn header_width(&self, name: &str) -> f64 {
        self.padding_x * 2.0 + self.icon_width + self.gap + self.text_width(name, self.header_char_width)
    }

    /// Key badge, name, type and the `NN` marker for non-nullable columns.
    fn row_width(&self, column: &Column) -> f64 {
        let mut w = self.padding_x * 2.0
            + self.icon_width
            + self.gap
            + self.text_width(&column.name, self.char_width)
            + self.gap
            + self.text_width(column.column_type.as_str(), self.type_char_width);
        if !column.is_nullable {
            w += self.gap + self.text_width("NN", self.type_char_width);
        }
        w
    }

    /// Tables are at least `min_table_width` wide and grow with their content.
    pub fn table_width(&self, table: &Table) -> f64 {
        table
            .columns
            .iter()
            .map(|c| self.row_width(c))
            .fold(self.header_width(&table.name), f64::max)
            .max(self.min_table_width)
    }

    pub fn table_height(&self, table: &Table) -> f64 {
        self.header_height + table.columns.len() as f64 * self.row_height
    }

    /// Vertical center of the row at `index`, relative to the table's top.
    pub fn row_center(&self, index: usize) -> f64 {
        self.header_height + index as f64 * self.row_height + self.row_height / 2.0
    }
}
