use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_QR_SIZE: u32 = 200;

/// Loosely-typed receipt description as supplied by the caller.
/// Quantities and prices arrive as whatever the caller sent (string
/// or number) and are rendered verbatim.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptData {
    pub store_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Option<String>,
    pub tax: Option<String>,
    pub total: Option<String>,
    pub payment_method: Option<String>,
    pub order_number: Option<String>,
    #[serde(deserialize_with = "lenient_size")]
    pub qr_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptItem {
    pub name: Option<String>,
    pub quantity: Option<Value>,
    pub price: Option<Value>,
}

impl ReceiptData {
    pub fn qr_size(&self) -> u32 {
        self.qr_size.unwrap_or(DEFAULT_QR_SIZE)
    }
}

/// Accepts an integer or a numeric string; anything else falls back
/// to the default size with a warning rather than rejecting the
/// whole receipt.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_size))
}

fn coerce_size(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as u32),
        // A junk override drops to the default size; the print itself
        // must not be rejected over it.
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Render a loose JSON value the way a receipt line shows it:
/// strings unquoted, numbers as-is, anything else via Display.
pub fn display_value(value: &Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Font weight for a rendered segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    Monospace,
    SansSerif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Rendering style for one text segment, chosen by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: u32,
    pub weight: FontWeight,
    pub font: FontFamily,
    pub align: Alignment,
}

impl TextStyle {
    /// Store name banner
    pub fn header() -> Self {
        Self {
            size: 50,
            weight: FontWeight::Bold,
            font: FontFamily::SansSerif,
            align: Alignment::Center,
        }
    }

    /// Receipt title and the ORDER NUMBER label
    pub fn sub_header() -> Self {
        Self {
            size: 35,
            weight: FontWeight::Bold,
            font: FontFamily::SansSerif,
            align: Alignment::Center,
        }
    }

    /// Regular receipt text
    pub fn body() -> Self {
        Self {
            size: 22,
            weight: FontWeight::Normal,
            font: FontFamily::Monospace,
            align: Alignment::Left,
        }
    }

    /// Item lines
    pub fn item() -> Self {
        Self {
            size: 25,
            weight: FontWeight::Normal,
            font: FontFamily::Monospace,
            align: Alignment::Left,
        }
    }

    /// Column headers and the TOTAL line
    pub fn emphasis() -> Self {
        Self {
            size: 26,
            weight: FontWeight::Bold,
            font: FontFamily::Monospace,
            align: Alignment::Left,
        }
    }

    /// Footer sections
    pub fn footnote() -> Self {
        Self {
            size: 20,
            weight: FontWeight::Normal,
            font: FontFamily::Monospace,
            align: Alignment::Left,
        }
    }

    /// The large tear-off order number
    pub fn order_number() -> Self {
        Self {
            size: 60,
            weight: FontWeight::Bold,
            font: FontFamily::SansSerif,
            align: Alignment::Center,
        }
    }

    /// Free-form printText payloads
    pub fn plain_text() -> Self {
        Self {
            size: 40,
            weight: FontWeight::Normal,
            font: FontFamily::Monospace,
            align: Alignment::Left,
        }
    }
}

/// One element of a composed print job, in rendering order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text { content: String, style: TextStyle },
    QrCode { data: String, size: u32 },
    Barcode { data: String },
}

impl Segment {
    pub fn text(content: impl Into<String>, style: TextStyle) -> Self {
        Self::Text {
            content: content.into(),
            style,
        }
    }

    pub fn blank(style: TextStyle) -> Self {
        Self::text("", style)
    }
}
