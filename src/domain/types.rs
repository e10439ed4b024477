//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! normalized/validated email, known enumeration labels) so that once a value
//! reaches the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::{ops::Deref, str::FromStr};

use phonenumber::{Mode, country, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// Phone number did not meet expected format.
    #[error("invalid phone number")]
    InvalidPhone,
    /// Month outside of the 1..=12 range.
    #[error("month must be between 1 and 12")]
    InvalidMonth,
    /// Negative amount or count where only non-negative values make sense.
    #[error("value must not be negative")]
    NegativeValue,
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(UserId, "Unique identifier for a portal user.");
id_newtype!(ClientId, "Unique identifier for a client hotel.");
id_newtype!(FolderId, "Unique identifier for a document folder.");
id_newtype!(DocumentId, "Unique identifier for an uploaded document.");
id_newtype!(TrainingId, "Unique identifier for a training session.");
id_newtype!(ConsumptionId, "Unique identifier for a monthly consumption record.");

/// Lower-cased and validated email address of a client contact.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ClientEmail(String);

impl ClientEmail {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ClientEmail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ClientEmail {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ClientEmail {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientEmail> for String {
    fn from(value: ClientEmail) -> Self {
        value.0
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Strips markup from free-form text, returning `None` when nothing is left.
pub fn sanitize_text(value: &str) -> Option<String> {
    let cleaned = ammonia::Builder::empty().clean(value).to_string();
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                Ok(Self(inner.into_inner()))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

non_empty_string_newtype!(ClientName, "Client (company) name enforcing non-empty values.");
non_empty_string_newtype!(HotelName, "Hotel name enforcing non-empty values.");
non_empty_string_newtype!(
    ContactPerson,
    "Name of the contact person at the hotel enforcing non-empty values."
);
non_empty_string_newtype!(FolderName, "Folder label enforcing non-empty values.");
non_empty_string_newtype!(DocumentName, "Document display name enforcing non-empty values.");
non_empty_string_newtype!(TrainingTitle, "Training title enforcing non-empty values.");
non_empty_string_newtype!(
    IdentityId,
    "Subject identifier issued by the identity provider."
);

/// Normalizes a phone number string to E.164 format.
///
/// Numbers without an international prefix are interpreted as Turkish.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed =
        parse(Some(country::Id::TR), trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Normalized phone number wrapper (expected E.164).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Constructs a phone number ensuring it is valid and normalizes to E.164 format.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_phone_to_e164(&value.into())?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

/// Calendar month in the 1..=12 range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub struct Month(u32);

impl Month {
    pub fn new(value: u32) -> Result<Self, TypeConstraintError> {
        if (1..=12).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidMonth)
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Zero-based position inside a twelve element series.
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// All months of the year in calendar order.
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12).map(Month)
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Month {
    type Error = TypeConstraintError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for Month {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let value = u32::try_from(value).map_err(|_| TypeConstraintError::InvalidMonth)?;
        Self::new(value)
    }
}

impl From<Month> for u32 {
    fn from(value: Month) -> Self {
        value.0
    }
}

/// Generates a closed enumeration persisted and serialized by its stable code,
/// with a localized label for display.
macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable code used for persistence and the JSON API.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Human readable label shown in the portal.
            pub const fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($code => Ok($name::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        "unknown {} `{other}`",
                        stringify!($name)
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }
    };
}

labeled_enum!(
    /// Certification stage a client hotel has reached.
    Stage {
        Stage1 => ("Stage1", "I. Aşama"),
        Stage2 => ("Stage2", "II. Aşama"),
        Stage3 => ("Stage3", "III. Aşama"),
    }
);

impl Default for Stage {
    fn default() -> Self {
        Stage::Stage1
    }
}

labeled_enum!(
    /// Consulting service delivered on the road to certification.
    ServiceType {
        SituationAnalysis => ("situation_analysis", "Mevcut durum analizi"),
        TeamDetermination => ("team_determination", "Çalışma ekibinin belirlenmesi"),
        ProjectPlanning => ("project_planning", "Proje planının oluşturulması"),
        RiskAssessment => ("risk_assessment", "Risk değerlendirmesi"),
        Training => ("training", "Eğitim-Bilinçlendirme faaliyetleri"),
        Monitoring => (
            "monitoring",
            "İzleme, Denetim Kayıtlarının Oluşturulması ve İyileştirme faaliyetleri"
        ),
        CertificationAudit => ("certification_audit", "Belgelendirme denetimi"),
    }
);

labeled_enum!(
    /// Classification of an uploaded document.
    DocumentType {
        Tr1Criteria => (
            "tr1_criteria",
            "Türkiye Sürdürülebilir Turizm Programı Kriterleri (TR-I)"
        ),
        Stage1Certificate => ("stage1_certificate", "I. Aşama Belgesi"),
        Stage2Certificate => ("stage2_certificate", "II. Aşama Belgesi"),
        Stage3Certificate => ("stage3_certificate", "III. Aşama Belgesi"),
        CarbonFootprintReport => ("carbon_footprint_report", "Karbon Ayak İzi Raporu"),
        SustainabilityReport => ("sustainability_report", "Sürdürülebilirlik Raporu"),
    }
);

labeled_enum!(
    /// Lifecycle of a training session.
    TrainingStatus {
        Planned => ("planned", "Planlandı"),
        Completed => ("completed", "Tamamlandı"),
        Cancelled => ("cancelled", "İptal Edildi"),
    }
);

impl Default for TrainingStatus {
    fn default() -> Self {
        TrainingStatus::Planned
    }
}

labeled_enum!(
    /// Portal role of an authenticated user.
    UserRole {
        Admin => ("admin", "Yönetici"),
        Client => ("client", "Müşteri"),
    }
);

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Client
    }
}

labeled_enum!(
    /// Whether a client-role user still has to go through the first-login setup.
    SetupStatus {
        Pending => ("pending", "Bekliyor"),
        Completed => ("completed", "Tamamlandı"),
        Skipped => ("skipped", "Atlandı"),
    }
);

impl Default for SetupStatus {
    fn default() -> Self {
        SetupStatus::Pending
    }
}

labeled_enum!(
    /// Metered resource tracked by the monthly consumption records.
    Resource {
        Electricity => ("electricity", "Elektrik"),
        Water => ("water", "Su"),
        NaturalGas => ("natural_gas", "Doğalgaz"),
        Coal => ("coal", "Kömür"),
    }
);

impl Resource {
    /// Measurement unit the amounts are recorded in.
    pub const fn unit(self) -> &'static str {
        match self {
            Resource::Electricity => "kWh",
            Resource::Water | Resource::NaturalGas => "m³",
            Resource::Coal => "kg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_reject_non_positive_values() {
        assert_eq!(ClientId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(ClientId::new(-3), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(ClientId::new(7).map(ClientId::get), Ok(7));
    }

    #[test]
    fn client_email_is_normalized() {
        let email = ClientEmail::new("  Info@Hotel.COM ").unwrap();
        assert_eq!(email.as_str(), "info@hotel.com");
        assert!(ClientEmail::new("not-an-email").is_err());
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(HotelName::new("  Deniz Otel ").unwrap().as_str(), "Deniz Otel");
        assert_eq!(HotelName::new("   "), Err(TypeConstraintError::EmptyString));
    }

    #[test]
    fn free_text_loses_markup() {
        assert_eq!(sanitize_text("<b>Hello</b>").as_deref(), Some("Hello"));
        assert_eq!(sanitize_text("  <br> "), None);
    }

    #[test]
    fn local_phone_numbers_are_normalized_as_turkish() {
        let phone = PhoneNumber::new("0532 123 45 67").unwrap();
        assert_eq!(phone.as_str(), "+905321234567");
        let international = PhoneNumber::new("+90 532 123 45 67").unwrap();
        assert_eq!(international, phone);
    }

    #[test]
    fn month_bounds_are_enforced() {
        assert!(Month::new(0).is_err());
        assert!(Month::new(13).is_err());
        assert_eq!(Month::new(12).unwrap().index(), 11);
        assert_eq!(Month::all().count(), 12);
    }

    #[test]
    fn enums_parse_their_codes() {
        assert_eq!("Stage2".parse::<Stage>(), Ok(Stage::Stage2));
        assert!("stage2".parse::<Stage>().is_err());
        assert_eq!(
            DocumentType::try_from("carbon_footprint_report"),
            Ok(DocumentType::CarbonFootprintReport)
        );
        assert_eq!(ServiceType::ALL.len(), 7);
        assert_eq!(DocumentType::ALL.len(), 6);
        assert_eq!(Resource::Coal.unit(), "kg");
    }

    #[test]
    fn enums_serialize_as_codes() {
        let json = serde_json::to_string(&Stage::Stage3).unwrap();
        assert_eq!(json, "\"Stage3\"");
        let parsed: ServiceType = serde_json::from_str("\"risk_assessment\"").unwrap();
        assert_eq!(parsed, ServiceType::RiskAssessment);
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }
}
