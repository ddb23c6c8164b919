//! List columns (`images`, `attachments`) are stored as JSON text.
//! This is the only place that converts between the two.

use crate::error::AppError;

pub fn encode_list(items: &[String]) -> Result<String, AppError> {
    Ok(serde_json::to_string(items)?)
}

/// Empty or blank text decodes to an empty list.
pub fn decode_list(raw: &str) -> Result<Vec<String>, AppError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|e| AppError::InternalServerError(format!("corrupt list column {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_as_json_array() {
        let paths = vec!["/uploads/a.png".to_string(), "/uploads/b.pdf".to_string()];
        assert_eq!(
            encode_list(&paths).unwrap(),
            r#"["/uploads/a.png","/uploads/b.pdf"]"#
        );
        assert_eq!(encode_list(&[]).unwrap(), "[]");
    }

    #[test]
    fn blank_column_is_empty_list() {
        assert!(decode_list("").unwrap().is_empty());
        assert!(decode_list("  ").unwrap().is_empty());
    }

    #[test]
    fn non_array_text_is_an_internal_error() {
        let err = decode_list("not json").unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }
}
