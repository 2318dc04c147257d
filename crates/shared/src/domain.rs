use serde_json::Number;

pub const POSITIVE_HEADLINE: &str = "COVID-19 Detected";
pub const NEGATIVE_HEADLINE: &str = "No COVID-19 Detected";
pub const NO_FILE_SELECTED_MESSAGE: &str = "Please select a file first";
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process the image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Negative,
    Positive,
}

impl Classification {
    /// Only a code numerically equal to `1` is positive (so `1.0` counts);
    /// every other number reads as negative.
    pub fn from_code(code: &Number) -> Self {
        if code.as_f64() == Some(1.0) {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::Positive => POSITIVE_HEADLINE,
            Self::Negative => NEGATIVE_HEADLINE,
        }
    }

    pub fn is_positive(self) -> bool {
        self == Self::Positive
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    message: String,
    code: Number,
}

impl Prediction {
    pub fn new(message: impl Into<String>, code: impl Into<Number>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &Number {
        &self.code
    }

    pub fn classification(&self) -> Classification {
        Classification::from_code(&self.code)
    }

    pub fn headline(&self) -> &'static str {
        self.classification().headline()
    }
}
