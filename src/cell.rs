use serde::{Deserialize, Serialize};

/// A single table value
///
/// Values arrive from the sheet as text. Numeric columns are coerced into
/// `Number`, or `Missing` when the text does not hold a finite number.
/// On the JSON side `Missing` is `null`, `Number` a JSON number and `Text` a
/// string, which is exactly what the grid editor sends back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Missing,
    Number(f64),
    Text(String),
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Text(String::new())
    }
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Coerce into a number, never failing
    pub fn to_numeric(&self) -> Cell {
        match self {
            Cell::Number(n) if n.is_finite() => Cell::Number(*n),
            Cell::Text(s) => parse_number(s).map_or(Cell::Missing, Cell::Number),
            _ => Cell::Missing,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    /// String form written to the backing store
    pub fn to_wire(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Parse a cell's text as a finite number
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Shortest text for a number; integral values carry no fractional part
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    n.to_string()
}
