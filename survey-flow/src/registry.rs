//! Mapping from question type codes to presentation templates.

use survey_flow_types::{QuestionType, TemplateId, TypeCode};

/// Template identifier for a known type code.
///
/// The mapping is total over [`TypeCode`] and injective: no two codes share
/// a template.
pub fn template_for(code: TypeCode) -> TemplateId {
    let name = match code {
        TypeCode::WelcomeScreen => "welcome_screen",
        TypeCode::ThankYouScreen => "thank_you_screen",
        TypeCode::MultipleChoice => "multiple_choice",
        TypeCode::PhoneNumber => "phone_number",
        TypeCode::ShortText => "short_text",
        TypeCode::LongText => "long_text",
        TypeCode::Statement => "statement",
        TypeCode::YesNo => "yes_no",
        TypeCode::Email => "email",
        TypeCode::OpinionScale => "opinion_scale",
        TypeCode::Rating => "rating",
        TypeCode::Date => "date",
        TypeCode::Number => "number",
        TypeCode::Dropdown => "dropdown",
        TypeCode::Legal => "legal",
        TypeCode::FileUpload => "file_upload",
        TypeCode::Payment => "payment",
        TypeCode::Website => "website",
    };
    TemplateId::new(name)
}

/// Returned by [`resolve_template`] for codes outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported question type {0:?}")]
pub struct UnsupportedType(pub String);

/// Resolve the template of a declared question type.
pub fn resolve_template(kind: &QuestionType) -> Result<TemplateId, UnsupportedType> {
    match kind {
        QuestionType::Supported(code) => Ok(template_for(*code)),
        QuestionType::Unsupported(raw) => Err(UnsupportedType(raw.clone())),
    }
}
