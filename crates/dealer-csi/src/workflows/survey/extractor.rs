//! Marker based scraping of the free-text description blob.
//!
//! The data service stores vehicle details inside an HTML-ish description such as
//! `نام خودرو: X200<br>رنگ خودرو: سفید`. Each marker is located independently on a
//! fresh scan of the blob; the first occurrence wins and the value runs until the
//! next `<` or the end of the text.

use serde::Serialize;

pub const CAR_MODEL: &str = "car_model";
pub const COLOR: &str = "color";
pub const CHASSIS_NUMBER: &str = "chassis_number";
pub const DELIVERY_DATE_TEXT: &str = "delivery_date_text";

const VEHICLE_MARKERS: [(&str, &str); 4] = [
    (CAR_MODEL, "نام خودرو"),
    (COLOR, "رنگ خودرو"),
    (CHASSIS_NUMBER, "شماره شاسی"),
    (DELIVERY_DATE_TEXT, "تاریخ تحویل"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMarker {
    pub field: String,
    pub marker: String,
}

impl FieldMarker {
    pub fn new(field: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            marker: marker.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkerExtractor {
    markers: Vec<FieldMarker>,
}

impl MarkerExtractor {
    pub fn new(markers: Vec<FieldMarker>) -> Self {
        Self { markers }
    }

    /// Extractor for the dealership vehicle markers.
    pub fn vehicle() -> Self {
        Self::new(
            VEHICLE_MARKERS
                .iter()
                .map(|(field, marker)| FieldMarker::new(*field, *marker))
                .collect(),
        )
    }

    pub fn extract(&self, blob: &str) -> ExtractedFields {
        let values = self
            .markers
            .iter()
            .map(|marker| (marker.field.clone(), capture_after(blob, &marker.marker)))
            .collect();

        ExtractedFields { values }
    }
}

/// Extraction result, one slot per configured marker in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    values: Vec<(String, Option<String>)>,
}

impl ExtractedFields {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

fn capture_after(blob: &str, marker: &str) -> Option<String> {
    if marker.is_empty() {
        return None;
    }

    let start = blob.find(marker)? + marker.len();
    let rest = blob[start..].trim_start();
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let end = rest.find('<').unwrap_or(rest.len());
    let value = rest[..end].trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Vehicle attributes shown next to a response. Missing markers yield empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub car_model: String,
    pub color: String,
    pub chassis_number: String,
    pub delivery_date_text: String,
}

impl VehicleInfo {
    pub fn from_description(description: &str) -> Self {
        Self::from_fields(&MarkerExtractor::vehicle().extract(description))
    }

    pub fn from_fields(fields: &ExtractedFields) -> Self {
        let take = |field: &str| fields.get(field).unwrap_or_default().to_string();
        Self {
            car_model: take(CAR_MODEL),
            color: take(COLOR),
            chassis_number: take(CHASSIS_NUMBER),
            delivery_date_text: take(DELIVERY_DATE_TEXT),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.car_model.is_empty()
            && self.color.is_empty()
            && self.chassis_number.is_empty()
            && self.delivery_date_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_model_and_color_from_markup() {
        let info = VehicleInfo::from_description("نام خودرو: X200<br>رنگ خودرو: سفید");
        assert_eq!(info.car_model, "X200");
        assert_eq!(info.color, "سفید");
        assert_eq!(info.chassis_number, "");
        assert_eq!(info.delivery_date_text, "");
    }

    #[test]
    fn blob_without_markers_yields_empty_fields() {
        let info = VehicleInfo::from_description("<p>customer asked for a call back</p>");
        assert_eq!(info, VehicleInfo::default());
        assert!(info.is_empty());
        assert!(VehicleInfo::from_description("").is_empty());
    }

    #[test]
    fn markers_are_searched_independently_and_first_match_wins() {
        let blob = "<div>شماره شاسی: NAS123456</div><div>تاریخ تحویل : 1403/05/12</div>\
                    <div>نام خودرو:Tiggo 8</div><div>نام خودرو: duplicate</div>";
        let info = VehicleInfo::from_description(blob);
        assert_eq!(info.chassis_number, "NAS123456");
        assert_eq!(info.delivery_date_text, "1403/05/12");
        assert_eq!(info.car_model, "Tiggo 8");
    }

    #[test]
    fn value_runs_to_end_of_text_without_markup() {
        let info = VehicleInfo::from_description("رنگ خودرو:   مشکی متالیک  ");
        assert_eq!(info.color, "مشکی متالیک");
    }

    #[test]
    fn custom_markers_can_replace_the_vehicle_set() {
        let extractor = MarkerExtractor::new(vec![
            FieldMarker::new("plate", "Plate"),
            FieldMarker::new("empty", ""),
        ]);
        let fields = extractor.extract("Model: ignored<br>Plate: 12-345");

        assert_eq!(fields.get("plate"), Some("12-345"));
        assert_eq!(fields.get("empty"), None);
        assert_eq!(fields.get("unknown"), None);
        assert_eq!(fields.iter().count(), 2);
    }
}
