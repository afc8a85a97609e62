use crate::ui::Panel;
use serde::Serialize;
use serde_json::Value;

pub const FIELD_NOTES_HEADER: &str = "Field Notes";
pub const SHOP_NOTES_HEADER: &str = "Shop/Office Notes";
pub const UPCOMING_HEADER: &str = "Upcoming";

const COLUMN_HEADERS: [&str; 3] = [FIELD_NOTES_HEADER, SHOP_NOTES_HEADER, UPCOMING_HEADER];
const UNKNOWN_NOTE: &str = "❓ Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotesView {
    pub field_notes: Panel<Vec<String>>,
    pub shop_notes: Panel<Vec<String>>,
    pub upcoming: Panel<Vec<String>>,
}

impl NotesView {
    fn all_unknown() -> Self {
        Self {
            field_notes: Panel::Unknown,
            shop_notes: Panel::Unknown,
            upcoming: Panel::Unknown,
        }
    }

    pub fn sections(&self) -> [(&'static str, &Panel<Vec<String>>); 3] {
        [
            (FIELD_NOTES_HEADER, &self.field_notes),
            (SHOP_NOTES_HEADER, &self.shop_notes),
            (UPCOMING_HEADER, &self.upcoming),
        ]
    }
}

fn cell_text(cell: Option<&Value>) -> Option<String> {
    match cell? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(UNKNOWN_NOTE.to_string()),
    }
}

fn column_notes(rows: &[Value], column: usize) -> Vec<String> {
    let header = COLUMN_HEADERS[column];

    rows.iter()
        .skip(1)
        .filter_map(|row| match row {
            Value::Array(cells) => cell_text(cells.get(column)),
            Value::Null => None,
            _ => Some(UNKNOWN_NOTE.to_string()),
        })
        .filter(|note| note != header)
        .collect()
}

/// Column 0 is field notes, 1 shop notes, 2 upcoming. Row 0 is the header row.
pub fn render_notes(payload: &Value) -> NotesView {
    let rows = match payload.get("values") {
        // The Sheets API omits `values` entirely for an empty range.
        None => &[][..],
        Some(Value::Array(rows)) => rows.as_slice(),
        Some(_) => {
            tracing::debug!("Notes payload `values` is not a grid");
            return NotesView::all_unknown();
        }
    };

    NotesView {
        field_notes: Panel::Ready(column_notes(rows, 0)),
        shop_notes: Panel::Ready(column_notes(rows, 1)),
        upcoming: Panel::Ready(column_notes(rows, 2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ready(panel: &Panel<Vec<String>>) -> Vec<String> {
        match panel {
            Panel::Ready(items) => items.clone(),
            Panel::Unknown => panic!("panel should be ready"),
        }
    }

    #[test]
    fn test_header_and_empty_cells_are_skipped() {
        let view = render_notes(&json!({
            "values": [
                ["Field Notes", "Shop/Office Notes", "Upcoming"],
                ["Mow", "Fix mower", ""],
                ["", "", ""]
            ]
        }));

        assert_eq!(ready(&view.field_notes), vec!["Mow"]);
        assert_eq!(ready(&view.shop_notes), vec!["Fix mower"]);
        assert!(ready(&view.upcoming).is_empty());
    }

    #[test]
    fn test_short_rows_do_not_shift_columns() {
        let view = render_notes(&json!({
            "values": [
                ["Field Notes", "Shop/Office Notes", "Upcoming"],
                ["Edge beds"],
                ["", "", "Spring cleanup"],
                ["Trim hedges", "Order parts"]
            ]
        }));

        assert_eq!(ready(&view.field_notes), vec!["Edge beds", "Trim hedges"]);
        assert_eq!(ready(&view.shop_notes), vec!["Order parts"]);
        assert_eq!(ready(&view.upcoming), vec!["Spring cleanup"]);
    }

    #[test]
    fn test_repeated_header_text_is_dropped() {
        let view = render_notes(&json!({
            "values": [
                ["Field Notes", "Shop/Office Notes", "Upcoming"],
                ["Field Notes", "Call vendor", "Upcoming"]
            ]
        }));

        assert!(ready(&view.field_notes).is_empty());
        assert_eq!(ready(&view.shop_notes), vec!["Call vendor"]);
        assert!(ready(&view.upcoming).is_empty());
    }

    #[test]
    fn test_malformed_rows_degrade_to_placeholder() {
        let view = render_notes(&json!({
            "values": [
                ["Field Notes", "Shop/Office Notes", "Upcoming"],
                "not a row",
                [{"nested": true}, 12, null]
            ]
        }));

        assert_eq!(ready(&view.field_notes), vec![UNKNOWN_NOTE, UNKNOWN_NOTE]);
        assert_eq!(ready(&view.shop_notes), vec![UNKNOWN_NOTE, "12"]);
        assert_eq!(ready(&view.upcoming), vec![UNKNOWN_NOTE]);
    }

    #[test]
    fn test_empty_range_renders_empty_lists() {
        let view = render_notes(&json!({"range": "Sheet1!A1:C100"}));
        assert!(ready(&view.field_notes).is_empty());
        assert!(ready(&view.shop_notes).is_empty());
        assert!(ready(&view.upcoming).is_empty());
    }

    #[test]
    fn test_non_grid_values_is_unknown() {
        let view = render_notes(&json!({"values": "oops"}));
        assert_eq!(view, NotesView::all_unknown());
    }
}
