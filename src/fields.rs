use std::collections::HashMap;

use serde::Serialize;

use crate::record::Attribute;

/// Logical output column. Each one may appear under several header aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    CompanyName,
    Address,
    Country,
    CountryCode,
    Region,
    City,
    Postcode,
    Street,
    StreetNumber,
    Latitude,
    Longitude,
    Phone,
    Website,
    Domain,
    Tld,
    YearFounded,
    EmployeeCount,
    ShortDescription,
    LongDescription,
    Email,
    Facebook,
    Linkedin,
    Twitter,
    Instagram,
    Youtube,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 25] = [
        CanonicalField::CompanyName,
        CanonicalField::Address,
        CanonicalField::Country,
        CanonicalField::CountryCode,
        CanonicalField::Region,
        CanonicalField::City,
        CanonicalField::Postcode,
        CanonicalField::Street,
        CanonicalField::StreetNumber,
        CanonicalField::Latitude,
        CanonicalField::Longitude,
        CanonicalField::Phone,
        CanonicalField::Website,
        CanonicalField::Domain,
        CanonicalField::Tld,
        CanonicalField::YearFounded,
        CanonicalField::EmployeeCount,
        CanonicalField::ShortDescription,
        CanonicalField::LongDescription,
        CanonicalField::Email,
        CanonicalField::Facebook,
        CanonicalField::Linkedin,
        CanonicalField::Twitter,
        CanonicalField::Instagram,
        CanonicalField::Youtube,
    ];

    /// Accepted header names, highest priority first.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::CompanyName => &["company_name"],
            CanonicalField::Address => &["main_address"],
            CanonicalField::Country => &["main_country"],
            CanonicalField::CountryCode => &["main_country_code"],
            CanonicalField::Region => &["main_region"],
            CanonicalField::City => &["main_city"],
            CanonicalField::Postcode => &["main_postcode"],
            CanonicalField::Street => &["main_street"],
            CanonicalField::StreetNumber => &["main_street_number"],
            CanonicalField::Latitude => &["main_latitude"],
            CanonicalField::Longitude => &["main_longitude"],
            CanonicalField::Phone => &["primary_phone"],
            CanonicalField::Website => &["website_url"],
            CanonicalField::Domain => &["website_domain"],
            CanonicalField::Tld => &["website_tld"],
            CanonicalField::YearFounded => &["year_founded"],
            CanonicalField::EmployeeCount => &["employee_count"],
            CanonicalField::ShortDescription => &["generated_description", "short_description"],
            CanonicalField::LongDescription => &["long_description"],
            CanonicalField::Email => &["email", "emails"],
            CanonicalField::Facebook => &["facebook_url", "facebook"],
            CanonicalField::Linkedin => &["linkedin_url", "linkedin"],
            CanonicalField::Twitter => &["twitter_url", "twitter"],
            CanonicalField::Instagram => &["instagram_url", "instagram"],
            CanonicalField::Youtube => &["youtube_url", "youtube"],
        }
    }

    /// Column a provider attribute lands in. Descriptions go through the
    /// short/long slot logic instead and map to nothing here.
    pub fn for_attribute(attribute: Attribute) -> Option<Self> {
        let field = match attribute {
            Attribute::Name => CanonicalField::CompanyName,
            Attribute::FormattedAddress => CanonicalField::Address,
            Attribute::Country => CanonicalField::Country,
            Attribute::CountryCode => CanonicalField::CountryCode,
            Attribute::Region => CanonicalField::Region,
            Attribute::City => CanonicalField::City,
            Attribute::Postcode => CanonicalField::Postcode,
            Attribute::Street => CanonicalField::Street,
            Attribute::StreetNumber => CanonicalField::StreetNumber,
            Attribute::Latitude => CanonicalField::Latitude,
            Attribute::Longitude => CanonicalField::Longitude,
            Attribute::Phone => CanonicalField::Phone,
            Attribute::Website => CanonicalField::Website,
            Attribute::YearFounded => CanonicalField::YearFounded,
            Attribute::EmployeeCount => CanonicalField::EmployeeCount,
            Attribute::Email => CanonicalField::Email,
            Attribute::Facebook => CanonicalField::Facebook,
            Attribute::Linkedin => CanonicalField::Linkedin,
            Attribute::Twitter => CanonicalField::Twitter,
            Attribute::Instagram => CanonicalField::Instagram,
            Attribute::Youtube => CanonicalField::Youtube,
            Attribute::Description => return None,
        };
        Some(field)
    }
}

/// Input columns that identify the company for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityField {
    Name,
    Country,
    CountryCode,
    City,
}

impl IdentityField {
    pub const ALL: [IdentityField; 4] = [
        IdentityField::Name,
        IdentityField::Country,
        IdentityField::CountryCode,
        IdentityField::City,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            IdentityField::Name => "input_company_name",
            IdentityField::Country => "input_main_country",
            IdentityField::CountryCode => "input_main_country_code",
            IdentityField::City => "input_main_city",
        }
    }
}

/// Header positions for every canonical and identity field, fixed for the run.
#[derive(Debug, Clone, Default)]
pub struct FieldResolution {
    output: HashMap<CanonicalField, usize>,
    identity: HashMap<IdentityField, usize>,
}

impl FieldResolution {
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let position = |name: &str| headers.iter().position(|header| header.as_ref() == name);

        let output = CanonicalField::ALL
            .iter()
            .filter_map(|field| {
                field
                    .aliases()
                    .iter()
                    .find_map(|alias| position(*alias))
                    .map(|index| (*field, index))
            })
            .collect();

        let identity = IdentityField::ALL
            .iter()
            .filter_map(|field| position(field.column()).map(|index| (*field, index)))
            .collect();

        Self { output, identity }
    }

    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.output.get(&field).copied()
    }

    pub fn identity(&self, field: IdentityField) -> Option<usize> {
        self.identity.get(&field).copied()
    }

    pub fn resolved_count(&self) -> usize {
        self.output.len()
    }
}
