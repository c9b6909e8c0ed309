use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of question type codes a survey can contain.
///
/// Codes are two characters wide on the wire (`"YN"`, `"S_"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeCode {
    WelcomeScreen,
    ThankYouScreen,
    MultipleChoice,
    PhoneNumber,
    ShortText,
    LongText,
    Statement,
    YesNo,
    Email,
    OpinionScale,
    Rating,
    Date,
    Number,
    Dropdown,
    Legal,
    FileUpload,
    Payment,
    Website,
}

impl TypeCode {
    /// Every code, in the order the type registry lists them.
    pub const ALL: [TypeCode; 18] = [
        TypeCode::WelcomeScreen,
        TypeCode::ThankYouScreen,
        TypeCode::MultipleChoice,
        TypeCode::PhoneNumber,
        TypeCode::ShortText,
        TypeCode::LongText,
        TypeCode::Statement,
        TypeCode::YesNo,
        TypeCode::Email,
        TypeCode::OpinionScale,
        TypeCode::Rating,
        TypeCode::Date,
        TypeCode::Number,
        TypeCode::Dropdown,
        TypeCode::Legal,
        TypeCode::FileUpload,
        TypeCode::Payment,
        TypeCode::Website,
    ];

    /// The two-character wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::WelcomeScreen => "WS",
            Self::ThankYouScreen => "TS",
            Self::MultipleChoice => "MC",
            Self::PhoneNumber => "PN",
            Self::ShortText => "ST",
            Self::LongText => "LT",
            Self::Statement => "S_",
            Self::YesNo => "YN",
            Self::Email => "E_",
            Self::OpinionScale => "OS",
            Self::Rating => "R_",
            Self::Date => "D_",
            Self::Number => "N_",
            Self::Dropdown => "DD",
            Self::Legal => "L_",
            Self::FileUpload => "FU",
            Self::Payment => "P_",
            Self::Website => "W_",
        }
    }

    /// Human readable name, e.g. `"Yes/No"`.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::WelcomeScreen => "Welcome Screen",
            Self::ThankYouScreen => "Thank You Screen",
            Self::MultipleChoice => "Multiple Choice",
            Self::PhoneNumber => "Phone Number",
            Self::ShortText => "Short Text",
            Self::LongText => "Long Text",
            Self::Statement => "Statement",
            Self::YesNo => "Yes/No",
            Self::Email => "Email",
            Self::OpinionScale => "Opinion Scale",
            Self::Rating => "Rating",
            Self::Date => "Date",
            Self::Number => "Number",
            Self::Dropdown => "Dropdown",
            Self::Legal => "Legal",
            Self::FileUpload => "File Upload",
            Self::Payment => "Payment",
            Self::Website => "Website",
        }
    }

    /// Look up a wire code. Returns `None` for anything outside the closed set.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Error returned when parsing a string that is not a known type code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown question type code: {0:?}")]
pub struct UnknownTypeCode(pub String);

impl FromStr for TypeCode {
    type Err = UnknownTypeCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownTypeCode(s.to_string()))
    }
}

/// The declared type of a question as it arrived from the fetch boundary.
///
/// Unknown codes are kept instead of rejected so that a single bad question
/// degrades to a blank screen rather than failing the whole sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    Supported(TypeCode),
    Unsupported(String),
}

impl QuestionType {
    /// The wire code, known or not.
    pub fn code(&self) -> &str {
        match self {
            Self::Supported(t) => t.code(),
            Self::Unsupported(raw) => raw,
        }
    }

    /// The known type code, if any.
    pub fn type_code(&self) -> Option<TypeCode> {
        match self {
            Self::Supported(t) => Some(*t),
            Self::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

impl From<TypeCode> for QuestionType {
    fn from(code: TypeCode) -> Self {
        Self::Supported(code)
    }
}

impl From<String> for QuestionType {
    fn from(raw: String) -> Self {
        match TypeCode::from_code(&raw) {
            Some(code) => Self::Supported(code),
            None => Self::Unsupported(raw),
        }
    }
}

impl From<&str> for QuestionType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<QuestionType> for String {
    fn from(value: QuestionType) -> Self {
        match value {
            QuestionType::Supported(t) => t.code().to_string(),
            QuestionType::Unsupported(raw) => raw,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}
