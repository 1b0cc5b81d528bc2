//! Runtime layout messages.
//!
//! ```text
//! adjustweight <delta>
//! adjustweight exact <value>
//! overridemainweights <w1> [<w2> ...]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use super::LayoutCommand;
use super::weights::{WeightParseError, parse_weight, parse_weights};
use crate::common::util::split_args;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MessageError {
    #[error("layout message has no command")]
    Empty,
    #[error("{command}: unknown specifier {specifier:?}")]
    UnknownSpecifier { command: &'static str, specifier: String },
    #[error("{command}: {source}")]
    InvalidNumber {
        command: &'static str,
        #[source]
        source: WeightParseError,
    },
    #[error("{command}: expected {expected} arguments, got {got}")]
    WrongArity {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum WeightAdjustment {
    Relative(f64),
    Exact(f64),
}

impl WeightAdjustment {
    pub fn apply(self, weight: f64) -> f64 {
        match self {
            WeightAdjustment::Relative(delta) => weight + delta,
            WeightAdjustment::Exact(value) => value,
        }
    }
}

const ADJUST_WEIGHT: &str = "adjustweight";
const OVERRIDE_MAIN_WEIGHTS: &str = "overridemainweights";

/// Parses a message into a command. Unknown commands give `Ok(None)`.
///
/// A bad weight list for `overridemainweights` is not an error: the command
/// is still produced, without weights, and still triggers a relayout.
pub fn parse_message(message: &str) -> Result<Option<LayoutCommand>, MessageError> {
    let args = split_args(message);
    let Some(&command) = args.first() else {
        return Err(MessageError::Empty);
    };

    match command {
        ADJUST_WEIGHT => parse_adjust_weight(&args).map(Some),
        OVERRIDE_MAIN_WEIGHTS => {
            if args.len() == 1 {
                error!("{OVERRIDE_MAIN_WEIGHTS} called without weights");
            }
            Ok(Some(LayoutCommand::OverrideMainWeights {
                weights: parse_weights(&args, 1, args.len()),
            }))
        }
        _ => Ok(None),
    }
}

fn parse_adjust_weight(args: &[&str]) -> Result<LayoutCommand, MessageError> {
    let number = |token: &str| {
        parse_weight(token).map_err(|source| MessageError::InvalidNumber { command: ADJUST_WEIGHT, source })
    };
    let adjustment = match *args {
        [_, delta] => WeightAdjustment::Relative(number(delta)?),
        [_, "exact", value] => WeightAdjustment::Exact(number(value)?),
        [_, specifier, _] => {
            return Err(MessageError::UnknownSpecifier {
                command: ADJUST_WEIGHT,
                specifier: specifier.to_string(),
            });
        }
        _ => {
            return Err(MessageError::WrongArity {
                command: ADJUST_WEIGHT,
                expected: "1 or 2",
                got: args.len().saturating_sub(1),
            });
        }
    };
    Ok(LayoutCommand::AdjustWeight { adjustment })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn relative_adjustment() {
        assert_eq!(
            parse_message("adjustweight -0.5"),
            Ok(Some(LayoutCommand::AdjustWeight {
                adjustment: WeightAdjustment::Relative(-0.5)
            }))
        );
    }

    #[test]
    fn exact_adjustment() {
        assert_eq!(
            parse_message("adjustweight exact 3"),
            Ok(Some(LayoutCommand::AdjustWeight {
                adjustment: WeightAdjustment::Exact(3.0)
            }))
        );
    }

    #[test]
    fn adjustment_applies_to_weight() {
        assert_eq!(WeightAdjustment::Relative(0.5).apply(1.0), 1.5);
        assert_eq!(WeightAdjustment::Exact(0.25).apply(4.0), 0.25);
    }

    #[test]
    fn adjust_weight_errors() {
        assert!(matches!(
            parse_message("adjustweight abc"),
            Err(MessageError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_message("adjustweight exact abc"),
            Err(MessageError::InvalidNumber { .. })
        ));
        assert_eq!(
            parse_message("adjustweight precise 2"),
            Err(MessageError::UnknownSpecifier {
                command: ADJUST_WEIGHT,
                specifier: "precise".into()
            })
        );
        assert!(matches!(parse_message("adjustweight"), Err(MessageError::WrongArity { got: 0, .. })));
        assert!(matches!(
            parse_message("adjustweight exact 1 2"),
            Err(MessageError::WrongArity { got: 3, .. })
        ));
    }

    #[test]
    fn override_weights() {
        assert_eq!(
            parse_message("overridemainweights 2 1"),
            Ok(Some(LayoutCommand::OverrideMainWeights { weights: Some(vec![2.0, 1.0]) }))
        );
    }

    #[test]
    fn override_weights_parse_failure_still_yields_command() {
        assert_eq!(
            parse_message("overridemainweights 2 x"),
            Ok(Some(LayoutCommand::OverrideMainWeights { weights: None }))
        );
    }

    #[test]
    fn override_without_weights_is_an_empty_list() {
        assert_eq!(
            parse_message("overridemainweights"),
            Ok(Some(LayoutCommand::OverrideMainWeights { weights: Some(vec![]) }))
        );
    }

    #[test]
    fn empty_and_unknown_messages() {
        assert_eq!(parse_message(""), Err(MessageError::Empty));
        assert_eq!(parse_message("   "), Err(MessageError::Empty));
        assert_eq!(parse_message("swapwithmaster"), Ok(None));
    }
}
