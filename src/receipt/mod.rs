//! Receipt

use std::{fmt::Write, io};

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::checkout::{OrderConfirmation, OrderLine, OrderRequest, PlacedOrder};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable summary of an order.
#[derive(Debug, Clone, Copy)]
pub struct Receipt<'o> {
    order: &'o OrderRequest,
    confirmation: Option<&'o OrderConfirmation>,
}

impl<'o> Receipt<'o> {
    /// Receipt for an order that has not been placed yet.
    #[must_use]
    pub fn for_order(order: &'o OrderRequest) -> Self {
        Self {
            order,
            confirmation: None,
        }
    }

    /// Receipt for a placed order, including its order number.
    #[must_use]
    pub fn for_placed(placed: &'o PlacedOrder) -> Self {
        Self {
            order: &placed.order,
            confirmation: Some(&placed.confirmation),
        }
    }

    /// Write the receipt table and totals to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Shade", "Qty", "Unit Price", "Total"]);

        for (idx, line) in self.order.lines.iter().enumerate() {
            push_line(&mut builder, idx, line);
        }

        write_receipt_table(&mut out, builder)?;

        write_receipt_summary(&mut out, self)
    }
}

fn push_line(builder: &mut Builder, idx: usize, line: &OrderLine) {
    builder.push_record([
        format!("#{:<3}", idx + 1),
        format!("{}\n{}", line.name, line.brand),
        line.variant.clone().unwrap_or_default(),
        line.quantity.to_string(),
        line.unit_price.to_string(),
        line.line_total.to_string(),
    ]);
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let order = receipt.order;
    let summary = &order.summary;

    let shipping_label = format!(
        " {} ({} days):",
        order.delivery.name, order.delivery.days
    );

    let mut rows = vec![
        (" Subtotal:".to_string(), format!("{}  ", summary.subtotal())),
        (shipping_label, format!("{}  ", summary.shipping())),
        (" Tax:".to_string(), format!("{}  ", summary.tax())),
        (
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", summary.total()),
        ),
        (" Payment:".to_string(), format!("{}  ", order.payment_method)),
    ];

    if let Some(confirmation) = receipt.confirmation {
        rows.push((" Order:".to_string(), format!("{}  ", confirmation.order_id)));
    }

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Dim box-drawing characters so the table borders recede behind the content.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Printable width of a string, ignoring ANSI escape sequences.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}
