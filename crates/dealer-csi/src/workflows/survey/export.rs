use serde::Serialize;
use std::io::Write;

use super::report::views::CustomerRowView;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write survey CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush survey CSV: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct CustomerCsvRow<'a> {
    #[serde(rename = "Customer")]
    customer: &'a str,
    #[serde(rename = "Phone")]
    phone: &'a str,
    #[serde(rename = "Score")]
    score: Option<String>,
    #[serde(rename = "Tier")]
    tier: &'a str,
    #[serde(rename = "Car Model")]
    car_model: &'a str,
    #[serde(rename = "Color")]
    color: &'a str,
    #[serde(rename = "Chassis Number")]
    chassis_number: &'a str,
    #[serde(rename = "Delivery")]
    delivery: &'a str,
    #[serde(rename = "Ignored")]
    ignored: bool,
    #[serde(rename = "Comments")]
    comments: String,
}

impl<'a> From<&'a CustomerRowView> for CustomerCsvRow<'a> {
    fn from(row: &'a CustomerRowView) -> Self {
        let delivery = if row.vehicle.delivery_date_text.is_empty() {
            row.delivery_period.as_str()
        } else {
            row.vehicle.delivery_date_text.as_str()
        };

        Self {
            customer: &row.display_name,
            phone: &row.phone_number,
            score: row.score.map(|score| format!("{score:.2}")),
            tier: row.tier_label.unwrap_or_default(),
            car_model: &row.vehicle.car_model,
            color: &row.vehicle.color,
            chassis_number: &row.vehicle.chassis_number,
            delivery,
            ignored: row.ignored,
            comments: row.comments.join(" | "),
        }
    }
}

/// Writes the customer rows as CSV with a header line.
pub fn write_customer_csv<W: Write>(rows: &[CustomerRowView], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv_writer.write_record(CSV_HEADERS)?;
    }
    for row in rows {
        csv_writer.serialize(CustomerCsvRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

const CSV_HEADERS: [&str; 10] = [
    "Customer",
    "Phone",
    "Score",
    "Tier",
    "Car Model",
    "Color",
    "Chassis Number",
    "Delivery",
    "Ignored",
    "Comments",
];
