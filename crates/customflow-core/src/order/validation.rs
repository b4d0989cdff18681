//! Validation rules for order input.
//!
//! Pure functions over raw request values. Each failure names the offending
//! field so the HTTP layer can return it to the caller as-is.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::model::{CornerStyle, OrderFields, OrderStatus, Source, Thickness};
use crate::error::{CustomFlowError, Result};

pub const ORDER_ID_MIN_CHARS: usize = 3;
pub const ORDER_ID_MAX_CHARS: usize = 100;
pub const CUSTOMER_NAME_MAX_CHARS: usize = 255;
pub const PHONE_NUMBER_MAX_CHARS: usize = 50;

/// Dimensions are stored as `DECIMAL(10, 2)`.
pub const DIMENSION_MIN: f64 = 0.01;
pub const DIMENSION_MAX: f64 = 99_999_999.99;

/// Raw order payload as submitted by a client, before validation.
///
/// Used for both create and full update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDraft {
    pub order_id: String,
    pub customer_name: String,
    pub source: String,
    pub phone_number: String,
    pub length: f64,
    pub width: f64,
    pub thickness: String,
    pub corner_style: String,
    pub notes: String,
    pub special_notes: String,
    pub image_files: Vec<String>,
}

impl OrderDraft {
    /// Validates and normalizes the draft.
    ///
    /// Empty `source`, `thickness` and `corner_style` fall back to `amazon`,
    /// `3mm` and `sharp`. Free-text fields are trimmed. The first failing rule
    /// aborts validation.
    pub fn validate(self) -> Result<(OrderFields, Vec<String>)> {
        let order_id = validate_order_id(&self.order_id)?;
        let source = parse_or_default::<Source>("source", &self.source, "amazon, whatsapp, sms, call")?;
        let thickness =
            parse_or_default::<Thickness>("thickness", &self.thickness, "2mm, 3mm, 5mm, 8mm")?;
        let corner_style =
            parse_or_default::<CornerStyle>("corner_style", &self.corner_style, "sharp, rounded, custom")?;
        let length = validate_dimension("length", self.length)?;
        let width = validate_dimension("width", self.width)?;

        let customer_name =
            validate_max_chars("customer_name", &self.customer_name, CUSTOMER_NAME_MAX_CHARS)?;
        let phone_number =
            validate_max_chars("phone_number", &self.phone_number, PHONE_NUMBER_MAX_CHARS)?;

        let fields = OrderFields {
            order_id,
            customer_name,
            source,
            phone_number,
            length,
            width,
            thickness,
            corner_style,
            notes: self.notes.trim().to_string(),
            special_notes: self.special_notes.trim().to_string(),
        };
        Ok((fields, self.image_files))
    }
}

/// Trims an external order identifier and checks its length bounds.
pub fn validate_order_id(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CustomFlowError::validation("order_id", "cannot be empty"));
    }
    let chars = trimmed.chars().count();
    if !(ORDER_ID_MIN_CHARS..=ORDER_ID_MAX_CHARS).contains(&chars) {
        return Err(CustomFlowError::validation(
            "order_id",
            format!("must be between {ORDER_ID_MIN_CHARS} and {ORDER_ID_MAX_CHARS} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Length and width are rounded to cents and must lie in
/// `DIMENSION_MIN..=DIMENSION_MAX` after rounding.
pub fn validate_dimension(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(CustomFlowError::validation(field, "must be a finite number"));
    }
    let cents = (value * 100.0).round() / 100.0;
    if cents < DIMENSION_MIN {
        return Err(CustomFlowError::validation(field, "must be at least 0.01"));
    }
    if cents > DIMENSION_MAX {
        return Err(CustomFlowError::validation(field, "must be at most 99999999.99"));
    }
    Ok(cents)
}

/// Trims a free-text field and checks its character count.
pub fn validate_max_chars(field: &str, raw: &str, max: usize) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > max {
        return Err(CustomFlowError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

/// Parses a status value. There is no default: an empty status is rejected.
pub fn parse_status(raw: &str) -> Result<OrderStatus> {
    OrderStatus::from_str(raw.trim()).map_err(|_| {
        CustomFlowError::validation("status", "must be one of new, in-progress, done")
    })
}

fn parse_or_default<T>(field: &str, raw: &str, allowed: &str) -> Result<T>
where
    T: FromStr + Default,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(T::default());
    }
    T::from_str(raw)
        .map_err(|_| CustomFlowError::validation(field, format!("must be one of {allowed}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft {
            order_id: "ORD-100".to_string(),
            length: 40.0,
            width: 30.0,
            thickness: "3mm".to_string(),
            corner_style: "sharp".to_string(),
            source: "amazon".to_string(),
            ..Default::default()
        }
    }

    fn failing_field(draft: OrderDraft) -> String {
        match draft.validate() {
            Err(CustomFlowError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_draft() {
        let (fields, images) = draft().validate().unwrap();
        assert_eq!(fields.order_id, "ORD-100");
        assert_eq!(fields.thickness, Thickness::Mm3);
        assert!(images.is_empty());
    }

    #[test]
    fn test_defaults_for_empty_enums() {
        let (fields, _) = OrderDraft {
            source: String::new(),
            thickness: String::new(),
            corner_style: "  ".to_string(),
            ..draft()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.source, Source::Amazon);
        assert_eq!(fields.thickness, Thickness::Mm3);
        assert_eq!(fields.corner_style, CornerStyle::Sharp);
    }

    #[test]
    fn test_order_id_is_trimmed_not_case_folded() {
        let (fields, _) = OrderDraft {
            order_id: "  ord-100 \n".to_string(),
            ..draft()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.order_id, "ord-100");
    }

    #[test]
    fn test_order_id_bounds() {
        assert_eq!(
            failing_field(OrderDraft {
                order_id: "   ".to_string(),
                ..draft()
            }),
            "order_id"
        );
        assert_eq!(
            failing_field(OrderDraft {
                order_id: "AB".to_string(),
                ..draft()
            }),
            "order_id"
        );
        assert_eq!(
            failing_field(OrderDraft {
                order_id: "X".repeat(101),
                ..draft()
            }),
            "order_id"
        );
        assert!(validate_order_id(&"X".repeat(100)).is_ok());
    }

    #[test]
    fn test_dimensions_must_be_positive() {
        assert_eq!(
            failing_field(OrderDraft {
                length: 0.0,
                ..draft()
            }),
            "length"
        );
        assert_eq!(
            failing_field(OrderDraft {
                width: -3.5,
                ..draft()
            }),
            "width"
        );
        assert!(validate_dimension("width", f64::NAN).is_err());
        assert!(validate_dimension("width", f64::INFINITY).is_err());
    }

    #[test]
    fn test_dimension_bounds_match_stored_precision() {
        assert!(validate_dimension("length", 0.001).is_err());
        assert!(validate_dimension("length", 0.004).is_err());
        assert_eq!(validate_dimension("length", 0.005).unwrap(), 0.01);
        assert_eq!(validate_dimension("length", 0.01).unwrap(), 0.01);
        assert_eq!(validate_dimension("length", 99_999_999.99).unwrap(), 99_999_999.99);
        assert!(validate_dimension("length", 100_000_000.0).is_err());
        assert!(validate_dimension("length", 1e9).is_err());
    }

    #[test]
    fn test_dimensions_are_rounded_to_cents() {
        let (fields, _) = OrderDraft {
            length: 40.129,
            width: 30.5,
            ..draft()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.length, 40.13);
        assert_eq!(fields.width, 30.5);
    }

    #[test]
    fn test_text_length_limits() {
        let (fields, _) = OrderDraft {
            customer_name: format!("  {}  ", "N".repeat(255)),
            phone_number: "5".repeat(50),
            ..draft()
        }
        .validate()
        .unwrap();
        assert_eq!(fields.customer_name.len(), 255);
        assert_eq!(fields.phone_number.len(), 50);

        assert_eq!(
            failing_field(OrderDraft {
                customer_name: "N".repeat(256),
                ..draft()
            }),
            "customer_name"
        );
        assert_eq!(
            failing_field(OrderDraft {
                phone_number: "5".repeat(51),
                ..draft()
            }),
            "phone_number"
        );
    }

    #[test]
    fn test_unknown_enum_values_are_rejected() {
        assert_eq!(
            failing_field(OrderDraft {
                source: "email".to_string(),
                ..draft()
            }),
            "source"
        );
        assert_eq!(
            failing_field(OrderDraft {
                thickness: "4mm".to_string(),
                ..draft()
            }),
            "thickness"
        );
        assert_eq!(
            failing_field(OrderDraft {
                corner_style: "Sharp".to_string(),
                ..draft()
            }),
            "corner_style"
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("new").unwrap(), OrderStatus::New);
        assert_eq!(parse_status("in-progress").unwrap(), OrderStatus::InProgress);
        assert_eq!(parse_status("done").unwrap(), OrderStatus::Done);
        assert!(parse_status("cancelled").is_err());
        assert!(parse_status("").is_err());
    }
}
