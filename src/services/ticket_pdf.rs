use data_encoding::BASE64;
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::models::WorkshopBooking;
use crate::utils::DashboardError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const ITEM_INDENT: f32 = 16.0;
const WRAP_AT: usize = 85;

#[derive(Debug, Clone, PartialEq)]
pub struct TicketLine {
    pub text: String,
    pub size: f32,
    pub x: f32,
    /// Distance from the top edge, in millimetres.
    pub y: f32,
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("N/A")
}

fn show<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Greedy word wrap. Words longer than the width are split.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }
        if word.is_empty() {
            continue;
        }

        let needed = match current.chars().count() {
            0 => word.chars().count(),
            used => used + 1 + word.chars().count(),
        };
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
    lines
}

/// Lays out the ticket. Builtin PDF fonts have no rupee glyph, so amounts use "Rs.".
pub fn ticket_lines(booking: &WorkshopBooking) -> Vec<TicketLine> {
    let mut layout = Layout::default();

    layout.push("Nritya Workshop Ticket".into(), 16.0, MARGIN, 8.0);
    layout.push(format!("Booking ID: {}", booking.booking_id), 12.0, MARGIN, 6.0);
    layout.push(format!("Workshop ID: {}", booking.workshop_id), 12.0, MARGIN, 6.0);
    layout.push(format!("Buyer: {}", or_na(&booking.buyer_name)), 12.0, MARGIN, 6.0);
    layout.push(format!("Email: {}", or_na(&booking.buyer_email)), 12.0, MARGIN, 6.0);
    layout.push(format!("Phone: {}", or_na(&booking.buyer_phone)), 12.0, MARGIN, 8.0);
    layout.push("Items:".into(), 12.0, MARGIN, 6.0);

    for (index, item) in booking.items.iter().flatten().enumerate() {
        let line = format!(
            "{}. {} | {} | {} {} | Qty: {} | Rs.{}",
            index + 1,
            show(&item.variant_description),
            show(&item.subvariant_description),
            show(&item.date),
            show(&item.time),
            show(&item.quantity),
            show(&item.subtotal),
        );
        for wrapped in wrap_line(&line, WRAP_AT) {
            layout.push(wrapped, 12.0, ITEM_INDENT, 6.0);
        }
        layout.y += 2.0;
    }

    layout.lines
}

struct Layout {
    lines: Vec<TicketLine>,
    y: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            lines: Vec::new(),
            y: 20.0,
        }
    }
}

impl Layout {
    fn push(&mut self, text: String, size: f32, x: f32, advance: f32) {
        self.lines.push(TicketLine { text, size, x, y: self.y });
        self.y += advance;
    }
}

pub fn render(booking: &WorkshopBooking) -> Result<Vec<u8>, DashboardError> {
    let render_error = |e: printpdf::Error| DashboardError::Render(format!("PDF error: {}", e));

    let (doc, page, layer) = PdfDocument::new(
        format!("Ticket {}", booking.booking_id),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "Ticket",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(render_error)?;
    let layer = doc.get_page(page).get_layer(layer);

    for line in ticket_lines(booking) {
        layer.use_text(line.text, line.size, Mm(line.x), Mm(PAGE_HEIGHT - line.y), &font);
    }

    doc.save_to_bytes().map_err(render_error)
}

/// Base64 of the rendered PDF, as the emailer expects in `pdf_data`.
pub fn render_base64(booking: &WorkshopBooking) -> Result<String, DashboardError> {
    Ok(BASE64.encode(&render(booking)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingItem;

    fn booking() -> WorkshopBooking {
        WorkshopBooking {
            booking_id: "B1".into(),
            workshop_id: "W1".into(),
            buyer_name: Some("Asha".into()),
            items: Some(vec![BookingItem {
                variant_description: Some("Contemporary".into()),
                subvariant_description: Some("Beginner".into()),
                date: Some("2024-06-01".into()),
                time: Some("10:00".into()),
                quantity: Some(2),
                subtotal: Some(998.0),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn lines_cover_header_and_items() {
        let lines = ticket_lines(&booking());
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();

        assert_eq!(texts[0], "Nritya Workshop Ticket");
        assert_eq!(texts[3], "Buyer: Asha");
        assert_eq!(texts[4], "Email: N/A");
        assert_eq!(
            texts[7],
            "1. Contemporary | Beginner | 2024-06-01 10:00 | Qty: 2 | Rs.998"
        );
        assert_eq!(lines[7].x, ITEM_INDENT);
        assert!(lines.windows(2).all(|w| w[0].y < w[1].y));
    }

    #[test]
    fn long_lines_wrap() {
        let text = "word ".repeat(40);
        let wrapped = wrap_line(&text, 20);
        assert!(wrapped.len() > 1);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(wrapped.join(" "), text.trim());

        assert_eq!(wrap_line(&"x".repeat(25), 10), vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn renders_a_pdf() {
        let bytes = render(&booking()).expect("pdf");
        assert!(bytes.starts_with(b"%PDF"));

        let encoded = render_base64(&booking()).expect("base64");
        let decoded = BASE64.decode(encoded.as_bytes()).expect("decode");
        assert!(decoded.starts_with(b"%PDF"));
    }
}
