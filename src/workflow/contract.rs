use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Accepts a `data:image/<subtype>;base64,<payload>` URL whose payload decodes.
pub fn validate_signature(signature_data: &str) -> Result<()> {
    let invalid = || Error::BadRequest("Signature must be a base64 image data URL".to_string());

    let rest = signature_data.strip_prefix("data:image/").ok_or_else(invalid)?;
    let (subtype, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;

    let valid_subtype = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_subtype {
        return Err(invalid());
    }

    let bytes = STANDARD.decode(payload).map_err(|_| invalid())?;
    if bytes.is_empty() {
        return Err(Error::BadRequest("Please provide your signature".to_string()));
    }
    Ok(())
}

pub fn validate_terms(title: &str, content: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::BadRequest("Contract title is required".to_string()));
    }
    if content.trim().is_empty() {
        return Err(Error::BadRequest("Contract content is required".to_string()));
    }
    Ok(())
}
