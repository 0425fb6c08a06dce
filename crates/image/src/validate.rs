//! Limit validation.
//!
//! A [`Limit`] caps width, height and byte size independently. Every
//! configured field is checked; each failure goes to the rule's own
//! [`ErrorHandler`] if it has one, otherwise to the [`Reporter`].

use crate::metadata::ImageMetadata;
use crate::report::{Reporter, TracingReporter};
use picpik_core::config::LimitConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A metadata field that can be limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitField {
    /// Width in pixels
    Width,
    /// Height in pixels
    Height,
    /// File size in bytes
    Size,
}

impl LimitField {
    /// Fields in check order
    pub const ALL: [LimitField; 3] = [LimitField::Width, LimitField::Height, LimitField::Size];

    /// Field name as it appears in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitField::Width => "width",
            LimitField::Height => "height",
            LimitField::Size => "size",
        }
    }

    /// Unit suffix for messages
    pub fn unit(&self) -> &'static str {
        match self {
            LimitField::Width | LimitField::Height => "px",
            LimitField::Size => "bytes",
        }
    }
}

impl fmt::Display for LimitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed limit check.
///
/// `selected_file_value` is always the file's actual value and `max` the
/// configured limit; sizes are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateError {
    /// Field that failed
    pub field: LimitField,
    /// Value found in the file
    pub selected_file_value: u64,
    /// Configured maximum
    pub max: u64,
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.field.unit();
        write!(
            f,
            "The image file's {} must be less than or equal to {}{unit} (got {}{unit})",
            self.field, self.max, self.selected_file_value
        )
    }
}

/// Callback invoked with a failed check instead of the reporter.
#[derive(Clone)]
pub struct ErrorHandler(Arc<dyn Fn(&ValidateError) + Send + Sync>);

impl ErrorHandler {
    /// Wrap a closure
    pub fn new(handler: impl Fn(&ValidateError) + Send + Sync + 'static) -> Self {
        Self(Arc::new(handler))
    }

    /// Invoke the handler
    pub fn call(&self, error: &ValidateError) {
        (self.0)(error)
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorHandler(..)")
    }
}

/// Upper bound for one field, with an optional handler.
///
/// Deserializes from a bare number or `{ max = N }`. Handlers only exist in
/// code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "LimitRuleRepr", into = "LimitRuleRepr")]
pub struct LimitRule {
    max: u64,
    on_error: Option<ErrorHandler>,
}

impl LimitRule {
    /// Rule with no handler
    pub fn new(max: u64) -> Self {
        Self { max, on_error: None }
    }

    /// Attach a handler
    #[must_use]
    pub fn with_handler(mut self, handler: impl Fn(&ValidateError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(ErrorHandler::new(handler));
        self
    }

    /// Maximum allowed value, inclusive
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Handler, if any
    pub fn handler(&self) -> Option<&ErrorHandler> {
        self.on_error.as_ref()
    }
}

impl From<u64> for LimitRule {
    fn from(max: u64) -> Self {
        Self::new(max)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LimitRuleRepr {
    Bare(u64),
    Record { max: u64 },
}

impl From<LimitRuleRepr> for LimitRule {
    fn from(repr: LimitRuleRepr) -> Self {
        match repr {
            LimitRuleRepr::Bare(max) | LimitRuleRepr::Record { max } => Self::new(max),
        }
    }
}

impl From<LimitRule> for LimitRuleRepr {
    fn from(rule: LimitRule) -> Self {
        LimitRuleRepr::Bare(rule.max)
    }
}

/// Per-field limits; a missing field is unconstrained.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Limit {
    /// Width limit in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<LimitRule>,
    /// Height limit in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<LimitRule>,
    /// Size limit in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<LimitRule>,
}

impl Limit {
    /// No constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the width
    #[must_use]
    pub fn max_width(self, max: u64) -> Self {
        self.with_rule(LimitField::Width, LimitRule::new(max))
    }

    /// Cap the height
    #[must_use]
    pub fn max_height(self, max: u64) -> Self {
        self.with_rule(LimitField::Height, LimitRule::new(max))
    }

    /// Cap the byte size
    #[must_use]
    pub fn max_size(self, max: u64) -> Self {
        self.with_rule(LimitField::Size, LimitRule::new(max))
    }

    /// Set the rule for `field`
    #[must_use]
    pub fn with_rule(mut self, field: LimitField, rule: LimitRule) -> Self {
        match field {
            LimitField::Width => self.width = Some(rule),
            LimitField::Height => self.height = Some(rule),
            LimitField::Size => self.size = Some(rule),
        }
        self
    }

    /// Rule for `field`, if constrained
    pub fn rule(&self, field: LimitField) -> Option<&LimitRule> {
        match field {
            LimitField::Width => self.width.as_ref(),
            LimitField::Height => self.height.as_ref(),
            LimitField::Size => self.size.as_ref(),
        }
    }

    /// True when nothing is constrained
    pub fn is_empty(&self) -> bool {
        LimitField::ALL.iter().all(|field| self.rule(*field).is_none())
    }

    /// Every failed check, in width, height, size order. No side effects.
    pub fn violations(&self, metadata: &ImageMetadata) -> Vec<ValidateError> {
        LimitField::ALL
            .into_iter()
            .filter_map(|field| {
                let rule = self.rule(field)?;
                let value = metadata.field_value(field);
                (value > rule.max).then_some(ValidateError {
                    field,
                    selected_file_value: value,
                    max: rule.max,
                })
            })
            .collect()
    }
}

impl From<&LimitConfig> for Limit {
    fn from(config: &LimitConfig) -> Self {
        Self {
            width: config.width.map(LimitRule::new),
            height: config.height.map(LimitRule::new),
            size: config.size.map(LimitRule::new),
        }
    }
}

/// Check `metadata` against `limit`, logging failures through `tracing`.
///
/// Returns `true` only when every configured field passes.
pub fn validate_image_file(limit: &Limit, metadata: &ImageMetadata) -> bool {
    validate_image_file_with(limit, metadata, &TracingReporter)
}

/// Check `metadata` against `limit`, sending unhandled failures to `reporter`.
pub fn validate_image_file_with(
    limit: &Limit,
    metadata: &ImageMetadata,
    reporter: &dyn Reporter,
) -> bool {
    let violations = limit.violations(metadata);
    for error in &violations {
        match limit.rule(error.field).and_then(LimitRule::handler) {
            Some(handler) => handler.call(error),
            None => reporter.validation_failed(error),
        }
    }
    violations.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{metadata, RecordingReporter};
    use std::sync::Mutex;

    fn danbi() -> ImageMetadata {
        metadata("danbi.jpg", 217, 232, 84_000)
    }

    #[test]
    fn test_empty_limit_passes() {
        assert!(validate_image_file(&Limit::new(), &danbi()));
        assert!(Limit::new().is_empty());
    }

    #[test]
    fn test_limit_is_inclusive() {
        let limit = Limit::new().max_width(217).max_height(232).max_size(84_000);
        assert!(limit.violations(&danbi()).is_empty());
        assert!(validate_image_file(&limit, &danbi()));
    }

    #[test]
    fn test_width_over_limit() {
        let reporter = RecordingReporter::default();
        let limit = Limit::new().max_width(200);
        assert!(!validate_image_file_with(&limit, &danbi(), &reporter));
        assert_eq!(
            reporter.validations(),
            vec![ValidateError {
                field: LimitField::Width,
                selected_file_value: 217,
                max: 200,
            }]
        );
    }

    #[test]
    fn test_every_failure_is_reported() {
        let reporter = RecordingReporter::default();
        let limit = Limit::new().max_width(100).max_height(100).max_size(1_000);
        assert!(!validate_image_file_with(&limit, &danbi(), &reporter));

        let fields: Vec<_> = reporter.validations().iter().map(|e| e.field).collect();
        assert_eq!(fields, LimitField::ALL);
    }

    #[test]
    fn test_handler_replaces_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let limit = Limit::new().max_height(100).with_rule(
            LimitField::Size,
            LimitRule::new(50_000).with_handler(move |e| sink.lock().unwrap().push(*e)),
        );

        let reporter = RecordingReporter::default();
        assert!(!validate_image_file_with(&limit, &danbi(), &reporter));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].field, LimitField::Size);
        assert_eq!(seen[0].selected_file_value, 84_000);
        assert_eq!(seen[0].max, 50_000);

        let reported: Vec<_> = reporter.validations().iter().map(|e| e.field).collect();
        assert_eq!(reported, vec![LimitField::Height]);
    }

    #[test]
    fn test_handler_not_called_on_pass() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let limit = Limit::new().with_rule(
            LimitField::Width,
            LimitRule::new(1_000).with_handler(move |_| *counter.lock().unwrap() += 1),
        );
        assert!(validate_image_file(&limit, &danbi()));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_limit_deserialize() {
        let limit: Limit = serde_json::from_str(r#"{"width":200,"size":{"max":100000}}"#).unwrap();
        assert_eq!(limit.width.as_ref().map(LimitRule::max), Some(200));
        assert!(limit.height.is_none());
        assert_eq!(limit.size.as_ref().map(LimitRule::max), Some(100_000));

        let limit: Limit = toml::from_str("height = 50").unwrap();
        assert_eq!(limit.height.as_ref().map(LimitRule::max), Some(50));
    }

    #[test]
    fn test_from_config() {
        let config = LimitConfig {
            width: Some(200),
            height: None,
            size: Some(1),
        };
        let limit = Limit::from(&config);
        assert_eq!(limit.violations(&danbi()).len(), 2);
    }

    #[test]
    fn test_error_serializes_camel_case() {
        let error = ValidateError {
            field: LimitField::Size,
            selected_file_value: 84_000,
            max: 50_000,
        };
        let json = serde_json::to_value(error).unwrap();
        assert_eq!(json["field"], "size");
        assert_eq!(json["selectedFileValue"], 84_000);
        assert_eq!(json["max"], 50_000);
        assert!(error.to_string().contains("50000bytes"));
    }
}
