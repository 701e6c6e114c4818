//! `printpdf` backend for [`InvoiceLayout`].

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect,
    Rgb,
};

use super::{Align, DrawOp, InvoiceError, InvoiceLayout, PAGE_HEIGHT, PAGE_WIDTH, Rgb8, text_width};

/// Render the layout to PDF bytes.
pub(super) fn render(layout: &InvoiceLayout, title: &str) -> Result<Vec<u8>, InvoiceError> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Invoice");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| InvoiceError::Render(e.to_string()))?;
    let canvas = doc.get_page(page).get_layer(layer);

    for op in &layout.ops {
        draw(&canvas, &font, op);
    }

    doc.save_to_bytes()
        .map_err(|e| InvoiceError::Render(e.to_string()))
}

fn draw(canvas: &PdfLayerReference, font: &IndirectFontRef, op: &DrawOp) {
    match op {
        DrawOp::Text {
            text,
            x,
            y,
            size,
            color,
            align,
        } => {
            let left = match align {
                Align::Left => *x,
                Align::Center => x - text_width(text, *size) / 2.0,
            };
            canvas.set_fill_color(rgb(*color));
            canvas.use_text(text.as_str(), *size, Mm(left), Mm(flip(*y)), font);
        }
        DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        } => {
            let mode = match (fill, stroke) {
                (Some(_), Some(_)) => PaintMode::FillStroke,
                (Some(_), None) => PaintMode::Fill,
                _ => PaintMode::Stroke,
            };
            if let Some(fill) = fill {
                canvas.set_fill_color(rgb(*fill));
            }
            if let Some(stroke) = stroke {
                canvas.set_outline_color(rgb(*stroke));
                canvas.set_outline_thickness(1.0);
            }
            let rect = Rect::new(
                Mm(*x),
                Mm(flip(y + height)),
                Mm(x + width),
                Mm(flip(*y)),
            )
            .with_mode(mode);
            canvas.add_rect(rect);
        }
        DrawOp::Line {
            x1,
            y1,
            x2,
            y2,
            color,
        } => {
            canvas.set_outline_color(rgb(*color));
            canvas.set_outline_thickness(0.75);
            canvas.add_line(Line {
                points: vec![
                    (Point::new(Mm(*x1), Mm(flip(*y1))), false),
                    (Point::new(Mm(*x2), Mm(flip(*y2))), false),
                ],
                is_closed: false,
            });
        }
    }
}

/// Layout y (from the top) to PDF y (from the bottom).
fn flip(y: f32) -> f32 {
    PAGE_HEIGHT - y
}

fn rgb((r, g, b): Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}
