use rand::Rng;

use domain::receipt::display_value;
use domain::{ReceiptData, ReceiptItem, Segment, TextStyle};

/// 32-column layout for standard thermal paper
const SEPARATOR: &str = "--------------------------------";
const DOUBLE_SEPARATOR: &str = "================================";
const COLUMN_HEADER: &str = "ITEM            QTY    AMOUNT";

const DEFAULT_STORE_NAME: &str = "BAR & GRILL";
const UNKNOWN_ITEM: &str = "Unknown Item";
const CURRENCY_PREFIX: &str = "Kshs ";

/// A composed receipt: the ordered segment sequence plus the order
/// number it carries (caller-supplied or synthesized).
#[derive(Debug, Clone, PartialEq)]
pub struct PrintJob {
    pub segments: Vec<Segment>,
    pub order_number: String,
}

/// Build the full receipt layout from a loose receipt description.
/// Missing optional fields are omitted outright; only the item name
/// and the order number get defaults.
pub fn compose_receipt(receipt: &ReceiptData) -> PrintJob {
    let order_number = receipt
        .order_number
        .clone()
        .unwrap_or_else(synthesize_order_number);

    let mut segments = Vec::new();

    // Store banner and title
    segments.push(Segment::text(
        receipt.store_name.as_deref().unwrap_or(DEFAULT_STORE_NAME),
        TextStyle::header(),
    ));
    segments.push(Segment::text("SALE RECEIPT", TextStyle::sub_header()));
    segments.push(Segment::blank(TextStyle::body()));

    if let Some(date) = &receipt.date {
        segments.push(Segment::text(format!("Date: {}", date), TextStyle::body()));
    }
    if let Some(time) = &receipt.time {
        segments.push(Segment::text(format!("Time: {}", time), TextStyle::body()));
    }

    // Item table
    segments.push(Segment::text(SEPARATOR, TextStyle::body()));
    segments.push(Segment::text(COLUMN_HEADER, TextStyle::emphasis()));
    segments.push(Segment::text(SEPARATOR, TextStyle::body()));
    for item in &receipt.items {
        segments.push(Segment::text(format_item_line(item), TextStyle::item()));
    }
    segments.push(Segment::text(SEPARATOR, TextStyle::body()));

    // Totals section, present only for the fields the caller sent
    if let Some(subtotal) = &receipt.subtotal {
        segments.push(Segment::text(
            format_amount_line("Subtotal:", subtotal),
            TextStyle::body(),
        ));
    }
    if let Some(tax) = &receipt.tax {
        segments.push(Segment::text(
            format_amount_line("Tax:", tax),
            TextStyle::body(),
        ));
    }
    if let Some(total) = &receipt.total {
        segments.push(Segment::text(DOUBLE_SEPARATOR, TextStyle::body()));
        segments.push(Segment::text(
            format_amount_line("TOTAL:", total),
            TextStyle::emphasis(),
        ));
        segments.push(Segment::text(DOUBLE_SEPARATOR, TextStyle::body()));
    }

    if let Some(payment_method) = &receipt.payment_method {
        segments.push(Segment::blank(TextStyle::footnote()));
        segments.push(Segment::text(
            format!("Payment Method: {}", payment_method),
            TextStyle::footnote(),
        ));
    }

    // Footer
    segments.push(Segment::blank(TextStyle::footnote()));
    segments.push(Segment::text(
        "Thank you for your visit!",
        TextStyle::footnote(),
    ));
    segments.push(Segment::text("Enjoy responsibly!", TextStyle::footnote()));

    // QR block carries the order number
    segments.push(Segment::blank(TextStyle::footnote()));
    segments.push(Segment::blank(TextStyle::footnote()));
    segments.push(Segment::text("Scan QR Code:", TextStyle::body()));
    segments.push(Segment::blank(TextStyle::footnote()));
    segments.push(Segment::QrCode {
        data: order_number.clone(),
        size: receipt.qr_size(),
    });

    // Tear-off order number block
    segments.push(Segment::blank(TextStyle::footnote()));
    segments.push(Segment::blank(TextStyle::footnote()));
    segments.push(Segment::text(DOUBLE_SEPARATOR, TextStyle::footnote()));
    segments.push(Segment::text("ORDER NUMBER", TextStyle::sub_header()));
    segments.push(Segment::text(order_number.as_str(), TextStyle::order_number()));
    segments.push(Segment::text(DOUBLE_SEPARATOR, TextStyle::footnote()));

    // Trailing feed so the tear line clears the print head
    for _ in 0..4 {
        segments.push(Segment::blank(TextStyle::footnote()));
    }

    PrintJob {
        segments,
        order_number,
    }
}

/// `{:<15} {:>3}x {:>9}` with names over 15 chars cut to 12 plus an
/// ellipsis
fn format_item_line(item: &ReceiptItem) -> String {
    let name = item.name.as_deref().unwrap_or(UNKNOWN_ITEM);
    let name = if name.chars().count() > 15 {
        let cut: String = name.chars().take(12).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    };

    let quantity = display_value(&item.quantity);
    let price = format!("{}{}", CURRENCY_PREFIX, display_value(&item.price));
    format!("{:<15} {:>3}x {:>9}", name, quantity, price)
}

fn format_amount_line(label: &str, amount: &str) -> String {
    format!("{:<20} {:>10}", label, format!("{}{}", CURRENCY_PREFIX, amount))
}

/// `ORD-` plus four random digits, used when the caller sent no order
/// number
fn synthesize_order_number() -> String {
    let n: u32 = rand::thread_rng().gen_range(1..=9999);
    format!("ORD-{:04}", n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(job: &PrintJob) -> Vec<String> {
        job.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_receipt_still_composes_skeleton() {
        let job = compose_receipt(&ReceiptData::default());
        let lines = texts(&job);

        assert_eq!(lines[0], DEFAULT_STORE_NAME);
        assert_eq!(lines[1], "SALE RECEIPT");
        assert!(lines.contains(&COLUMN_HEADER.to_string()));
        assert!(lines.contains(&"Thank you for your visit!".to_string()));
        assert!(lines.contains(&"ORDER NUMBER".to_string()));

        // No totals section without totals
        assert!(!lines.iter().any(|l| l.starts_with("Subtotal:")));
        assert!(!lines.iter().any(|l| l.starts_with("TOTAL:")));
        assert!(!lines.iter().any(|l| l.starts_with("Payment Method:")));
    }

    #[test]
    fn test_synthesized_order_number_shape() {
        let job = compose_receipt(&ReceiptData::default());
        assert_eq!(job.order_number.len(), 8);
        assert!(job.order_number.starts_with("ORD-"));
        assert!(job.order_number[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_caller_order_number_wins() {
        let receipt: ReceiptData =
            serde_json::from_value(json!({"orderNumber": "ORD-0042"})).unwrap();
        let job = compose_receipt(&receipt);
        assert_eq!(job.order_number, "ORD-0042");
    }

    #[test]
    fn test_qr_segment_carries_order_number_and_size() {
        let receipt: ReceiptData =
            serde_json::from_value(json!({"orderNumber": "ORD-7777", "qrSize": 300})).unwrap();
        let job = compose_receipt(&receipt);
        assert!(job.segments.contains(&Segment::QrCode {
            data: "ORD-7777".to_string(),
            size: 300,
        }));
    }

    #[test]
    fn test_long_item_name_truncates() {
        let item: ReceiptItem = serde_json::from_value(json!({
            "name": "Extra Long Craft Beer Name",
            "quantity": "2",
            "price": "500"
        }))
        .unwrap();
        let line = format_item_line(&item);
        assert!(line.starts_with("Extra Long C..."));
        assert!(line.contains("2x"));
        assert!(line.contains("Kshs 500"));
    }

    #[test]
    fn test_null_item_name_renders_unknown() {
        let item: ReceiptItem =
            serde_json::from_value(json!({"quantity": 1, "price": 100})).unwrap();
        let line = format_item_line(&item);
        assert!(line.starts_with(UNKNOWN_ITEM));
    }

    #[test]
    fn test_totals_section_wraps_total_in_double_separators() {
        let receipt: ReceiptData = serde_json::from_value(json!({
            "subtotal": "900", "tax": "100", "total": "1000"
        }))
        .unwrap();
        let lines = texts(&compose_receipt(&receipt));

        let total_idx = lines
            .iter()
            .position(|l| l.starts_with("TOTAL:"))
            .expect("total line");
        assert_eq!(lines[total_idx - 1], DOUBLE_SEPARATOR);
        assert_eq!(lines[total_idx + 1], DOUBLE_SEPARATOR);
        assert!(lines[..total_idx].iter().any(|l| l.starts_with("Subtotal:")));
        assert!(lines[..total_idx].iter().any(|l| l.starts_with("Tax:")));
    }

    #[test]
    fn test_optional_date_time_omitted_not_defaulted() {
        let lines = texts(&compose_receipt(&ReceiptData::default()));
        assert!(!lines.iter().any(|l| l.starts_with("Date:")));
        assert!(!lines.iter().any(|l| l.starts_with("Time:")));

        let receipt: ReceiptData =
            serde_json::from_value(json!({"date": "2025-01-01"})).unwrap();
        let lines = texts(&compose_receipt(&receipt));
        assert!(lines.contains(&"Date: 2025-01-01".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Time:")));
    }
}
