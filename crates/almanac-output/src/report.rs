//! Timestamped result envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A required field was not set on the builder.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// A serialized result with what it describes and when it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// What the report covers: a ticker or a universe name.
    pub subject: String,

    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,

    /// Years of history the results were computed over.
    pub lookback_years: u32,

    /// Configuration the results were computed with.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub config: serde_json::Value,

    /// Report contents.
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(subject: String, lookback_years: u32, contents: serde_json::Value) -> Self {
        Self {
            subject,
            generated_at: Utc::now(),
            lookback_years,
            config: serde_json::Value::Null,
            contents,
        }
    }

    /// Convert report to a pretty JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    subject: Option<String>,
    lookback_years: Option<u32>,
    config: Option<serde_json::Value>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the lookback.
    pub const fn lookback_years(mut self, years: u32) -> Self {
        self.lookback_years = Some(years);
        self
    }

    /// Attach the configuration used.
    pub fn config<T: Serialize>(mut self, config: &T) -> Result<Self, ReportError> {
        self.config = Some(serde_json::to_value(config)?);
        Ok(self)
    }

    /// Set the report contents.
    pub fn contents<T: Serialize>(mut self, contents: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(contents)?);
        Ok(self)
    }

    /// Build the report. Subject and contents are required.
    pub fn build(self) -> Result<Report, ReportError> {
        let subject = self.subject.ok_or(ReportError::MissingField("subject"))?;
        let contents = self.contents.ok_or(ReportError::MissingField("contents"))?;
        let mut report = Report::new(subject, self.lookback_years.unwrap_or(10), contents);
        report.config = self.config.unwrap_or_default();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new("AAPL".to_string(), 5, serde_json::json!({"months": []}));
        assert_eq!(report.subject, "AAPL");
        assert_eq!(report.lookback_years, 5);
        assert!(report.config.is_null());
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .subject("tier-1")
            .lookback_years(15)
            .config(&serde_json::json!({"holdingPeriods": [3]}))
            .unwrap()
            .contents(&vec![1, 2, 3])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(report.subject, "tier-1");
        assert_eq!(report.lookback_years, 15);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"generatedAt\""));
        assert!(json.contains("\"holdingPeriods\""));
    }

    #[test]
    fn test_builder_requires_contents() {
        let err = ReportBuilder::new().subject("AAPL").build().unwrap_err();
        assert!(matches!(err, ReportError::MissingField("contents")));
    }
}
