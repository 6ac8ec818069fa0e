use benchcmp_core::errors::{BenchError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Digit generation rule for floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "digits")]
pub enum FloatFormat {
    /// Shortest decimal digit string that parses back to the same binary64.
    #[default]
    ShortestRoundTrip,
    /// Exactly `n` significant digits (1..=17), trailing zeros removed.
    /// Seventeen digits always round-trip a binary64.
    Significant(u8),
}

/// Treatment of NaN and the infinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NonFinitePolicy {
    /// Fail with a non-finite number error naming the path.
    #[default]
    Reject,
    /// Emit the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.
    Permissive,
}

/// Whitespace layout of the emitted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// `,` and `:` separators without spaces.
    #[default]
    Compact,
    /// Two-space indentation, one entry per line, `": "` after keys.
    Pretty,
}

/// Options for a single encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EncodeOptions {
    /// Float digit rule.
    #[serde(default)]
    pub float_format: FloatFormat,
    /// NaN / infinity policy.
    #[serde(default)]
    pub non_finite: NonFinitePolicy,
    /// Whitespace layout.
    #[serde(default)]
    pub layout: Layout,
}

impl EncodeOptions {
    /// Compact, permissive options used when embedding payloads in diagnostics.
    pub const fn diagnostic() -> Self {
        Self {
            float_format: FloatFormat::ShortestRoundTrip,
            non_finite: NonFinitePolicy::Permissive,
            layout: Layout::Compact,
        }
    }

    /// Switches to the pretty layout.
    pub const fn pretty(mut self) -> Self {
        self.layout = Layout::Pretty;
        self
    }

    /// Opts into the permissive non-finite policy.
    pub const fn permissive(mut self) -> Self {
        self.non_finite = NonFinitePolicy::Permissive;
        self
    }

    /// Replaces the float digit rule.
    pub const fn with_float_format(mut self, float_format: FloatFormat) -> Self {
        self.float_format = float_format;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), BenchError> {
        if let FloatFormat::Significant(digits) = self.float_format {
            if !(1..=17).contains(&digits) {
                return Err(BenchError::Config(
                    ErrorInfo::new(
                        "float-format-digits",
                        format!("significant digit count {digits} is outside 1..=17"),
                    )
                    .with_hint("17 significant digits always round-trip a binary64"),
                ));
            }
        }
        Ok(())
    }
}
