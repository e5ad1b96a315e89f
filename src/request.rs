//! Request-side codes the rate extractor needs to know about.
//!
//! Building and sending the request is the caller's job; these are only the
//! values it has to agree on with the response side.

use std::fmt;

/// Domestic service requested in a `RateV4Request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    All,
    Online,
    FirstClass,
    FirstClassCommercial,
    FirstClassHfpCommercial,
    Priority,
    PriorityCommercial,
    Express,
    ExpressCommercial,
    StandardPost,
    Media,
    Library,
}

impl Service {
    /// Request code as the vendor spells it.
    pub fn code(self) -> &'static str {
        match self {
            Service::All => "ALL",
            Service::Online => "ONLINE",
            Service::FirstClass => "FIRST CLASS",
            Service::FirstClassCommercial => "FIRST CLASS COMMERCIAL",
            Service::FirstClassHfpCommercial => "FIRST CLASS HFP COMMERCIAL",
            Service::Priority => "PRIORITY",
            Service::PriorityCommercial => "PRIORITY COMMERCIAL",
            Service::Express => "EXPRESS",
            Service::ExpressCommercial => "EXPRESS COMMERCIAL",
            Service::StandardPost => "STANDARD POST",
            Service::Media => "MEDIA",
            Service::Library => "LIBRARY",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().replace('_', " ").to_ascii_uppercase();
        [
            Service::All,
            Service::Online,
            Service::FirstClass,
            Service::FirstClassCommercial,
            Service::FirstClassHfpCommercial,
            Service::Priority,
            Service::PriorityCommercial,
            Service::Express,
            Service::ExpressCommercial,
            Service::StandardPost,
            Service::Media,
            Service::Library,
        ]
        .into_iter()
        .find(|service| service.code() == normalized)
    }

    pub fn is_first_class(self) -> bool {
        matches!(self, Service::FirstClass | Service::FirstClassCommercial | Service::FirstClassHfpCommercial)
    }

    /// Mail types the vendor accepts alongside this service. Empty for
    /// services that take no mail type.
    pub fn first_class_mail_types(self) -> &'static [FirstClassMailType] {
        match self {
            Service::FirstClass => &[
                FirstClassMailType::Letter,
                FirstClassMailType::Flat,
                FirstClassMailType::Parcel,
                FirstClassMailType::Postcard,
            ],
            Service::FirstClassCommercial | Service::FirstClassHfpCommercial => &[FirstClassMailType::PackageService],
            _ => &[],
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FirstClassMailType {
    Letter,
    Flat,
    Parcel,
    Postcard,
    PackageService,
}

impl FirstClassMailType {
    /// Accepts `letter`, `flat`, `parcel`, `postcard` / `post_card` and
    /// `package_service` / `package service`, in any case.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
            "letter" => Some(FirstClassMailType::Letter),
            "flat" => Some(FirstClassMailType::Flat),
            "parcel" => Some(FirstClassMailType::Parcel),
            "postcard" | "post_card" => Some(FirstClassMailType::Postcard),
            "package_service" => Some(FirstClassMailType::PackageService),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            FirstClassMailType::Letter => "LETTER",
            FirstClassMailType::Flat => "FLAT",
            FirstClassMailType::Parcel => "PARCEL",
            FirstClassMailType::Postcard => "POSTCARD",
            FirstClassMailType::PackageService => "PACKAGE SERVICE",
        }
    }
}

/// Five-digit form of a US zip code: `12345-6789` becomes `12345`.
pub fn zip5(zip: &str) -> &str {
    let zip = zip.trim();
    match zip.split_once('-') {
        Some((head, _)) => head.trim_end(),
        None => zip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_normalization() {
        assert_eq!(zip5("90210-1234"), "90210");
        assert_eq!(zip5(" 10001 "), "10001");
        assert_eq!(zip5("K1P 1J1"), "K1P 1J1");
    }

    #[test]
    fn mail_type_parsing() {
        assert_eq!(FirstClassMailType::parse("Letter"), Some(FirstClassMailType::Letter));
        assert_eq!(FirstClassMailType::parse("post_card"), Some(FirstClassMailType::Postcard));
        assert_eq!(FirstClassMailType::parse("PACKAGE SERVICE"), Some(FirstClassMailType::PackageService));
        assert_eq!(FirstClassMailType::parse("box"), None);
    }

    #[test]
    fn service_codes_round_trip_through_text() {
        assert_eq!(Service::from_code("first class commercial"), Some(Service::FirstClassCommercial));
        assert_eq!(Service::from_code("standard_post"), Some(Service::StandardPost));
        assert_eq!(Service::from_code("carrier pigeon"), None);
        assert!(Service::FirstClass.is_first_class());
        assert!(Service::Priority.first_class_mail_types().is_empty());
    }
}
