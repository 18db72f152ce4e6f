//! Input validation functions
//!
//! Storage accepts whatever it is given; these checks run at the caller
//! boundary before anything is written.

use crate::dates::parse_date_bucket;
use crate::errors::ValidationError;
use crate::models::MealType;
use chrono::NaiveDate;

/// Minimum trimmed length of a food search query worth sending to storage
pub const MIN_SEARCH_QUERY_LEN: usize = 2;

/// Validate a serving multiplier (must be positive and finite)
pub fn validate_servings(servings: f64) -> Result<(), ValidationError> {
    validate_positive("servings", servings)
}

/// Validate a water amount in ml (must be positive and finite)
pub fn validate_water_amount(amount_ml: f64) -> Result<(), ValidationError> {
    validate_positive("amount", amount_ml)
}

/// Validate a per-serving nutrition value (non-negative and finite)
pub fn validate_nutrient(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value < 0.0 {
        return Err(ValidationError::Negative { field });
    }
    Ok(())
}

/// Validate an opaque user identifier
pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::Empty { field: "user_id" });
    }
    Ok(())
}

/// Parse a meal type supplied as text
pub fn parse_meal_type(value: &str) -> Result<MealType, ValidationError> {
    Ok(value.trim().to_lowercase().parse::<MealType>()?)
}

/// Parse a `YYYY-MM-DD` date bucket supplied by a caller
///
/// The shape is checked strictly: `2024-1-5` is rejected even though a lenient
/// date parser would accept it, because buckets are compared as strings.
pub fn parse_date_bucket_input(value: &str) -> Result<NaiveDate, ValidationError> {
    let shape = regex_lite::Regex::new(r"^\d{4}-\d{2}-\d{2}$")
        .map_err(|_| ValidationError::DateBucket(value.to_string()))?;
    if !shape.is_match(value) {
        return Err(ValidationError::DateBucket(value.to_string()));
    }
    parse_date_bucket(value).map_err(|_| ValidationError::DateBucket(value.to_string()))
}

/// Whether a search query is long enough to run
pub fn is_searchable_query(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SEARCH_QUERY_LEN
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive { field });
    }
    Ok(())
}
