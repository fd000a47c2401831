//! The closed vocabulary of issue codes and their message templates.
//!
//! Every code belongs to exactly one [`IssuePhase`] and carries a fixed [`Severity`]. Codes that
//! arrive as strings (from a serialized report, a caller, a config file) never fail to parse: an
//! unrecognized string becomes [`ErrorCode::Unknown`], which still renders a message and still
//! carries the original code text.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Which stage of processing a code originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssuePhase {
    Validation,
    Sidecar,
    Schema,
    Definition,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    // Validation errors
    CharacterInvalid,
    CommaMissing,
    DefExpandInvalid,
    DefUnmatched,
    DefValueExtra,
    DefValueMissing,
    GroupEmpty,
    InvalidParentNode,
    NoValidTagFound,
    NodeNameEmpty,
    ParenthesesMismatch,
    PlaceholderInvalid,
    TagDuplicated,
    TagEmpty,
    TagExtensionInvalid,
    TagGroupError,
    TagNotUnique,
    TagRequiresChild,
    TildesUnsupported,
    UnitsInvalid,
    ValueInvalid,
    // Validation warnings
    CapitalizationWarning,
    RequiredPrefixMissing,
    TagExtended,
    UnitClassDefaultUsed,
    // Sidecar errors
    SidecarBlankHedString,
    SidecarInvalidPoundSignsCategory,
    SidecarInvalidPoundSignsValue,
    SidecarWrongDataType,
    // Schema build errors and warnings
    SchemaDuplicateNode,
    SchemaInvalidCapitalization,
    SchemaInvalidCharactersInDesc,
    SchemaInvalidCharactersInTag,
    SchemaUnknownUnitClass,
    // Definition errors
    DefinitionDefTagInDefinition,
    DefinitionDuplicate,
    DefinitionInvalidPlacement,
    DefinitionTagInSchema,
    DefinitionWrongNumberDefTags,
    DefinitionWrongNumberGroupTags,
    DefinitionWrongNumberPlaceholderTags,
    /// A code outside the known vocabulary. Holds the code text as given.
    Unknown(String),
}

impl ErrorCode {
    pub fn all() -> &'static [ErrorCode] {
        &[
            ErrorCode::CharacterInvalid,
            ErrorCode::CommaMissing,
            ErrorCode::DefExpandInvalid,
            ErrorCode::DefUnmatched,
            ErrorCode::DefValueExtra,
            ErrorCode::DefValueMissing,
            ErrorCode::GroupEmpty,
            ErrorCode::InvalidParentNode,
            ErrorCode::NoValidTagFound,
            ErrorCode::NodeNameEmpty,
            ErrorCode::ParenthesesMismatch,
            ErrorCode::PlaceholderInvalid,
            ErrorCode::TagDuplicated,
            ErrorCode::TagEmpty,
            ErrorCode::TagExtensionInvalid,
            ErrorCode::TagGroupError,
            ErrorCode::TagNotUnique,
            ErrorCode::TagRequiresChild,
            ErrorCode::TildesUnsupported,
            ErrorCode::UnitsInvalid,
            ErrorCode::ValueInvalid,
            ErrorCode::CapitalizationWarning,
            ErrorCode::RequiredPrefixMissing,
            ErrorCode::TagExtended,
            ErrorCode::UnitClassDefaultUsed,
            ErrorCode::SidecarBlankHedString,
            ErrorCode::SidecarInvalidPoundSignsCategory,
            ErrorCode::SidecarInvalidPoundSignsValue,
            ErrorCode::SidecarWrongDataType,
            ErrorCode::SchemaDuplicateNode,
            ErrorCode::SchemaInvalidCapitalization,
            ErrorCode::SchemaInvalidCharactersInDesc,
            ErrorCode::SchemaInvalidCharactersInTag,
            ErrorCode::SchemaUnknownUnitClass,
            ErrorCode::DefinitionDefTagInDefinition,
            ErrorCode::DefinitionDuplicate,
            ErrorCode::DefinitionInvalidPlacement,
            ErrorCode::DefinitionTagInSchema,
            ErrorCode::DefinitionWrongNumberDefTags,
            ErrorCode::DefinitionWrongNumberGroupTags,
            ErrorCode::DefinitionWrongNumberPlaceholderTags,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::CharacterInvalid => "CHARACTER_INVALID",
            ErrorCode::CommaMissing => "COMMA_MISSING",
            ErrorCode::DefExpandInvalid => "DEF_EXPAND_INVALID",
            ErrorCode::DefUnmatched => "DEF_UNMATCHED",
            ErrorCode::DefValueExtra => "DEF_VALUE_EXTRA",
            ErrorCode::DefValueMissing => "DEF_VALUE_MISSING",
            ErrorCode::GroupEmpty => "GROUP_EMPTY",
            ErrorCode::InvalidParentNode => "INVALID_PARENT_NODE",
            ErrorCode::NoValidTagFound => "NO_VALID_TAG_FOUND",
            ErrorCode::NodeNameEmpty => "NODE_NAME_EMPTY",
            ErrorCode::ParenthesesMismatch => "PARENTHESES_MISMATCH",
            ErrorCode::PlaceholderInvalid => "PLACEHOLDER_INVALID",
            ErrorCode::TagDuplicated => "TAG_REPEATED",
            ErrorCode::TagEmpty => "TAG_EMPTY",
            ErrorCode::TagExtensionInvalid => "TAG_EXTENSION_INVALID",
            ErrorCode::TagGroupError => "TAG_GROUP_ERROR",
            ErrorCode::TagNotUnique => "TAG_NOT_UNIQUE",
            ErrorCode::TagRequiresChild => "TAG_REQUIRES_CHILD",
            ErrorCode::TildesUnsupported => "TILDES_UNSUPPORTED",
            ErrorCode::UnitsInvalid => "UNITS_INVALID",
            ErrorCode::ValueInvalid => "VALUE_INVALID",
            ErrorCode::CapitalizationWarning => "STYLE_WARNING",
            ErrorCode::RequiredPrefixMissing => "REQUIRED_PREFIX_MISSING",
            ErrorCode::TagExtended => "TAG_EXTENDED",
            ErrorCode::UnitClassDefaultUsed => "UNIT_CLASS_DEFAULT_USED",
            ErrorCode::SidecarBlankHedString => "SIDECAR_BLANK_HED_STRING",
            ErrorCode::SidecarInvalidPoundSignsCategory => "SIDECAR_INVALID_POUND_SIGNS_CATEGORY",
            ErrorCode::SidecarInvalidPoundSignsValue => "SIDECAR_INVALID_POUND_SIGNS_VALUE",
            ErrorCode::SidecarWrongDataType => "SIDECAR_WRONG_HED_DATA_TYPE",
            ErrorCode::SchemaDuplicateNode => "SCHEMA_DUPLICATE_NODE",
            ErrorCode::SchemaInvalidCapitalization => "SCHEMA_INVALID_CAPITALIZATION",
            ErrorCode::SchemaInvalidCharactersInDesc => "SCHEMA_INVALID_CHARACTERS_IN_DESC",
            ErrorCode::SchemaInvalidCharactersInTag => "SCHEMA_INVALID_CHARACTERS_IN_TAG",
            ErrorCode::SchemaUnknownUnitClass => "SCHEMA_UNKNOWN_UNIT_CLASS",
            ErrorCode::DefinitionDefTagInDefinition => "DEFINITION_DEF_TAG_IN_DEFINITION",
            ErrorCode::DefinitionDuplicate => "DEFINITION_DUPLICATE",
            ErrorCode::DefinitionInvalidPlacement => "DEFINITION_INVALID_PLACEMENT",
            ErrorCode::DefinitionTagInSchema => "DEFINITION_TAG_IN_SCHEMA",
            ErrorCode::DefinitionWrongNumberDefTags => "DEFINITION_WRONG_NUMBER_DEF_TAGS",
            ErrorCode::DefinitionWrongNumberGroupTags => "DEFINITION_WRONG_NUMBER_GROUP_TAGS",
            ErrorCode::DefinitionWrongNumberPlaceholderTags => {
                "DEFINITION_WRONG_NUMBER_PLACEHOLDER_TAGS"
            }
            ErrorCode::Unknown(code) => code.as_str(),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            ErrorCode::CapitalizationWarning
            | ErrorCode::RequiredPrefixMissing
            | ErrorCode::TagExtended
            | ErrorCode::UnitClassDefaultUsed
            | ErrorCode::SchemaInvalidCapitalization => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn phase(&self) -> IssuePhase {
        match self {
            ErrorCode::SidecarBlankHedString
            | ErrorCode::SidecarInvalidPoundSignsCategory
            | ErrorCode::SidecarInvalidPoundSignsValue
            | ErrorCode::SidecarWrongDataType => IssuePhase::Sidecar,
            ErrorCode::SchemaDuplicateNode
            | ErrorCode::SchemaInvalidCapitalization
            | ErrorCode::SchemaInvalidCharactersInDesc
            | ErrorCode::SchemaInvalidCharactersInTag
            | ErrorCode::SchemaUnknownUnitClass => IssuePhase::Schema,
            ErrorCode::DefinitionDefTagInDefinition
            | ErrorCode::DefinitionDuplicate
            | ErrorCode::DefinitionInvalidPlacement
            | ErrorCode::DefinitionTagInSchema
            | ErrorCode::DefinitionWrongNumberDefTags
            | ErrorCode::DefinitionWrongNumberGroupTags
            | ErrorCode::DefinitionWrongNumberPlaceholderTags => IssuePhase::Definition,
            ErrorCode::Unknown(_) => IssuePhase::Internal,
            _ => IssuePhase::Validation,
        }
    }

    /// Message template for this code. Placeholders are written `{name}` and filled from
    /// [`super::IssueParams`]. `Unknown` codes have no template; the reporter supplies the
    /// internal-error fallback for them.
    pub fn template(&self) -> Option<&'static str> {
        let template = match self {
            ErrorCode::CharacterInvalid => "Invalid character '{character}' at index {index}",
            ErrorCode::CommaMissing => "Comma missing after - '{tag}'",
            ErrorCode::DefExpandInvalid => {
                "Def-expand group for '{def_name}' does not match its definition. Expected '{expected}', found '{found}'"
            }
            ErrorCode::DefUnmatched => "Def tag does not match any known definition - '{tag}'",
            ErrorCode::DefValueExtra => {
                "Definition '{def_name}' takes no placeholder value, but one was given - '{tag}'"
            }
            ErrorCode::DefValueMissing => {
                "Definition '{def_name}' requires a placeholder value, but none was given - '{tag}'"
            }
            ErrorCode::GroupEmpty => "Empty group found at index {index}",
            ErrorCode::InvalidParentNode => {
                "'{tag}' appears as '{expected_parent}' and cannot be used as an extension"
            }
            ErrorCode::NoValidTagFound => "'{tag}' is not a valid base hed tag",
            ErrorCode::NodeNameEmpty => {
                "Tag has an empty node name (leading, trailing, or consecutive slashes) - '{tag}'"
            }
            ErrorCode::ParenthesesMismatch => {
                "Number of opening and closing parentheses are unequal. {opening_count} opening parentheses. {closing_count} closing parentheses"
            }
            ErrorCode::PlaceholderInvalid => "Placeholder '#' is not allowed here - '{tag}'",
            ErrorCode::TagDuplicated => "Repeated tag - '{tag}'",
            ErrorCode::TagEmpty => "HED tags cannot be empty. Extra delimiter found at index {index}",
            ErrorCode::TagExtensionInvalid => {
                "'{tag}' does not allow extensions; '{extension}' is not a valid child"
            }
            ErrorCode::TagGroupError => "'{tag}' must appear in a top-level tag group",
            ErrorCode::TagNotUnique => "Multiple unique tags with prefix - '{tag_prefix}'",
            ErrorCode::TagRequiresChild => "Descendant tag required - '{tag}'",
            ErrorCode::TildesUnsupported => {
                "Tildes are not supported. Replace '~' at index {index} with a comma and group the tags"
            }
            ErrorCode::UnitsInvalid => "Invalid unit - '{tag}' valid units are '{units}'",
            ErrorCode::ValueInvalid => "'{tag}' has an invalid value '{value}'",
            ErrorCode::CapitalizationWarning => "First word not capitalized or camel case - '{tag}'",
            ErrorCode::RequiredPrefixMissing => "Tag with prefix '{tag_prefix}' is required",
            ErrorCode::TagExtended => "Hed tag is extended. '{extension}' in '{tag}'",
            ErrorCode::UnitClassDefaultUsed => {
                "No unit specified. Using '{default_unit}' as the default - '{tag}'"
            }
            ErrorCode::SidecarBlankHedString => "No HED string found for key '{key}'",
            ErrorCode::SidecarInvalidPoundSignsCategory => {
                "There should be no # in a category string, found {pound_sign_count}"
            }
            ErrorCode::SidecarInvalidPoundSignsValue => {
                "There should be exactly one # in a value string, found {pound_sign_count}"
            }
            ErrorCode::SidecarWrongDataType => {
                "Invalid HED string datatype in sidecar. Should be '{expected_type}', but got '{given_type}'"
            }
            ErrorCode::SchemaDuplicateNode => "Duplicate term '{tag}' used {count} places: {paths}",
            ErrorCode::SchemaInvalidCapitalization => {
                "First character of '{tag}' must be a capital letter"
            }
            ErrorCode::SchemaInvalidCharactersInDesc => {
                "Invalid character '{character}' in description for '{tag}' at position {index}"
            }
            ErrorCode::SchemaInvalidCharactersInTag => {
                "Invalid character '{character}' in tag '{tag}' at position {index}"
            }
            ErrorCode::SchemaUnknownUnitClass => {
                "'{tag}' references unit class '{unit_class}' which the schema does not define"
            }
            ErrorCode::DefinitionDefTagInDefinition => {
                "Def tags are not allowed in the contents of definition '{def_name}': {tag_list}"
            }
            ErrorCode::DefinitionDuplicate => "Definition '{def_name}' is defined multiple times",
            ErrorCode::DefinitionInvalidPlacement => {
                "Definition tag must be the only tag in a top-level group - '{tag}'"
            }
            ErrorCode::DefinitionTagInSchema => {
                "Term '{def_name}' is already a schema tag and cannot be re-used as a definition"
            }
            ErrorCode::DefinitionWrongNumberDefTags => {
                "Expected exactly one Definition tag in the group for '{def_name}', found: {tag_list}"
            }
            ErrorCode::DefinitionWrongNumberGroupTags => {
                "Definition '{def_name}' may contain only one tag group. Found: {tag_list}"
            }
            ErrorCode::DefinitionWrongNumberPlaceholderTags => {
                "Incorrect number of placeholder tags in definition '{def_name}'. Expected {expected_count}, found: {tag_list}"
            }
            ErrorCode::Unknown(_) => return None,
        };
        Some(template)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ErrorCode::Unknown(_))
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        let normalized = code.trim().to_ascii_uppercase();
        ErrorCode::all()
            .iter()
            .find(|known| known.as_str() == normalized)
            .cloned()
            .unwrap_or_else(|| ErrorCode::Unknown(code.to_string()))
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::from(code.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
