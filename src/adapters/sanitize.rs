//! Log sanitization for clinical input values.
//!
//! Services avoid logging raw feature values, but a stray `{:?}` of a form or
//! a third-party error message can still carry them. This module redacts:
//! - `key=value` / `key: value` pairs for every catalog key
//! - categorical choice labels attached to a catalog key
//! - email addresses and UUIDs
//!
//! Sanitization is applied centrally by wrapping the log writer in
//! [`SanitizingMakeWriter`], so callsites need not remember to call it.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

use crate::domain::catalog::FEATURE_CATALOG;

/// Maximum number of bytes sanitized per line. Longer input is truncated.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

const REDACTED_VALUE: &str = "[REDACTED]";

struct Rule {
    regex: Regex,
    replacement: String,
}

struct Rules {
    set: RegexSet,
    rules: Vec<Rule>,
}

/// Per-line limit, read once from `HEARTCHECK_SANITIZE_MAX_BYTES`.
fn max_sanitize_bytes() -> usize {
    static MAX_BYTES: OnceLock<usize> = OnceLock::new();
    *MAX_BYTES.get_or_init(|| {
        std::env::var("HEARTCHECK_SANITIZE_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn rules() -> &'static Rules {
    static RULES: OnceLock<Rules> = OnceLock::new();
    RULES.get_or_init(|| {
        let mut specs: Vec<(String, String)> = Vec::new();

        // Choice labels may contain spaces, so they get their own rule per field,
        // ahead of the generic single-token value rule.
        for spec in FEATURE_CATALOG.iter().filter(|f| !f.is_numeric()) {
            let mut labels: Vec<&str> = spec.choices().iter().map(|c| c.label).collect();
            labels.sort_by_key(|l| std::cmp::Reverse(l.len()));
            let alternation = labels
                .iter()
                .map(|l| regex::escape(l))
                .collect::<Vec<_>>()
                .join("|");
            specs.push((
                format!(r#"\b({})\b(\s*[:=]\s*)"?(?:{})"?"#, spec.key, alternation),
                format!("${{1}}${{2}}{REDACTED_VALUE}"),
            ));
        }

        let keys = FEATURE_CATALOG
            .iter()
            .map(|f| f.key)
            .collect::<Vec<_>>()
            .join("|");
        specs.push((
            format!(r#"\b({keys})\b(\s*[:=]\s*)"?-?[0-9][0-9.eE+-]*"?"#),
            format!("${{1}}${{2}}{REDACTED_VALUE}"),
        ));

        specs.push((
            r"(?i)\b[a-z0-9._%+-]{1,64}@(?:[a-z0-9-]{1,63}\.)+[a-z]{2,}\b".to_string(),
            "[REDACTED-EMAIL]".to_string(),
        ));
        specs.push((
            r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}"
                .to_string(),
            "[REDACTED-UUID]".to_string(),
        ));

        let set = RegexSet::new(specs.iter().map(|(p, _)| p.as_str())).expect("Valid regex set");
        let rules = specs
            .into_iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(&pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Rules { set, rules }
    })
}

/// Redact clinical values and identifiers from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let rules = rules();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    // Rules are applied in declaration order so choice labels go before numbers.
    for idx in rules.set.matches(prefix).into_iter() {
        let rule = &rules.rules[idx];
        result = rule
            .regex
            .replace_all(&result, rule.replacement.as_str())
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
        // Keep the record terminator so the next record starts on its own line.
        if input.ends_with('\n') {
            result.push('\n');
        }
    }
    result
}

/// Check whether a string carries anything [`sanitize`] would redact.
#[must_use]
pub fn contains_clinical_values(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    rules().set.is_match(prefix)
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted line
/// before it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<bool> {
        let line = String::from_utf8_lossy(bytes);
        let sanitized = sanitize(&line);
        self.inner.write_all(sanitized.as_bytes())?;
        Ok(sanitized.ends_with('\n'))
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A huge line without newlines is flushed as-is (sanitized and truncated).
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            if !self.write_sanitized(&pending)? {
                self.inner.write_all(b"\n")?;
            }
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redacts_numeric_pairs() {
        let out = sanitize("submitted age=63 chol: 233 oldpeak=2.3");
        assert_eq!(out, "submitted age=[REDACTED] chol: [REDACTED] oldpeak=[REDACTED]");
    }

    #[test]
    fn test_redacts_choice_labels() {
        let out = sanitize(r#"form cp="Non-Anginal Pain", thal=Reversible Defect"#);
        assert!(!out.contains("Non-Anginal"));
        assert!(!out.contains("Reversible"));
        assert!(out.contains("cp=[REDACTED]"));
        assert!(out.contains("thal=[REDACTED]"));
    }

    #[test]
    fn test_keeps_unrelated_text() {
        let line = "Loaded model artifacts (n_features=13)";
        assert_eq!(sanitize(line), line);
        assert!(!contains_clinical_values(line));
        assert!(contains_clinical_values("trestbps=145"));
    }

    #[test]
    fn test_redacts_email_and_uuid() {
        let out = sanitize("user someone@clinic.org id 550e8400-e29b-41d4-a716-446655440000");
        assert!(out.contains("[REDACTED-EMAIL]"));
        assert!(out.contains("[REDACTED-UUID]"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let out = sanitize_with_limit("prefix age=63 suffix", 10);
        assert!(out.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_truncation_keeps_line_terminator() {
        let out = sanitize_with_limit("prefix age=63 suffix\n", 10);
        assert_eq!(out, "prefix age [TRUNCATED]\n");
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let make = SanitizingMakeWriter::new(|| Vec::<u8>::new());
        let mut writer = make.make_writer();
        writer.write_all(b"thalach=150\n").expect("write");
        assert_eq!(writer.inner, b"thalach=[REDACTED]\n");
    }
}
