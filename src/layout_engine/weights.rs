use thiserror::Error;
use tracing::error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeightParseError {
    #[error("not a number: {0:?}")]
    Invalid(String),
    #[error("number out of range: {0:?}")]
    OutOfRange(String),
}

/// Parses one weight. Values must be finite; sign is not checked.
pub fn parse_weight(token: &str) -> Result<f64, WeightParseError> {
    let value: f64 = token
        .trim()
        .parse()
        .map_err(|_| WeightParseError::Invalid(token.to_string()))?;
    if !value.is_finite() {
        return Err(WeightParseError::OutOfRange(token.to_string()));
    }
    Ok(value)
}

/// Parses `tokens[start..end]` (the range is clamped to the token count) into
/// weights. Any bad token discards the whole list.
pub fn parse_weights<S: AsRef<str>>(tokens: &[S], start: usize, end: usize) -> Option<Vec<f64>> {
    let end = end.min(tokens.len());
    let start = start.min(end);
    let mut weights = Vec::with_capacity(end - start);
    for token in &tokens[start..end] {
        match parse_weight(token.as_ref()) {
            Ok(weight) => weights.push(weight),
            Err(e) => {
                error!("Could not parse weight list: {e}");
                return None;
            }
        }
    }
    Some(weights)
}

/// Parses every token.
pub fn parse_all_weights<S: AsRef<str>>(tokens: &[S]) -> Option<Vec<f64>> {
    parse_weights(tokens, 0, tokens.len())
}
