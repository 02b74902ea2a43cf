//! Property-name heuristics
//!
//! Maps common property names (`firstName`, `email`, `created_at`) to a
//! provider method so that untyped or loosely typed fields still get realistic
//! values.

use crate::domain::{SchemaKind, SchemaNode};

/// Shape a smart-default method produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    String,
    Number,
    Boolean,
    /// An object-like value; also acceptable where a string is expected once
    /// serialized.
    Structured,
}

impl OutputKind {
    /// Whether a schema of `kind` accepts values of this output kind.
    pub fn is_compatible_with(self, kind: SchemaKind) -> bool {
        match self {
            OutputKind::String => kind == SchemaKind::String,
            OutputKind::Number => matches!(kind, SchemaKind::Number | SchemaKind::Integer),
            OutputKind::Boolean => kind == SchemaKind::Boolean,
            OutputKind::Structured => matches!(kind, SchemaKind::Object | SchemaKind::String),
        }
    }
}

/// A table hit: the provider method to invoke and what it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartDefault {
    pub method: &'static str,
    pub output: OutputKind,
}

static TABLE: &[(&str, &str, OutputKind)] = &[
    // Identity
    ("firstname", "person.firstName", OutputKind::String),
    ("givenname", "person.firstName", OutputKind::String),
    ("lastname", "person.lastName", OutputKind::String),
    ("surname", "person.lastName", OutputKind::String),
    ("familyname", "person.lastName", OutputKind::String),
    ("fullname", "person.fullName", OutputKind::String),
    ("name", "person.fullName", OutputKind::String),
    ("displayname", "person.fullName", OutputKind::String),
    ("username", "internet.userName", OutputKind::String),
    ("login", "internet.userName", OutputKind::String),
    ("password", "internet.password", OutputKind::String),
    ("age", "person.age", OutputKind::Number),
    ("jobtitle", "person.jobTitle", OutputKind::String),
    ("bio", "person.bio", OutputKind::String),
    ("id", "string.uuid", OutputKind::String),
    ("uuid", "string.uuid", OutputKind::String),
    ("guid", "string.uuid", OutputKind::String),
    // Contact
    ("email", "internet.email", OutputKind::String),
    ("emailaddress", "internet.email", OutputKind::String),
    ("phone", "phone.number", OutputKind::String),
    ("phonenumber", "phone.number", OutputKind::String),
    ("telephone", "phone.number", OutputKind::String),
    ("mobile", "phone.cell", OutputKind::String),
    ("cellphone", "phone.cell", OutputKind::String),
    ("url", "internet.url", OutputKind::String),
    ("website", "internet.url", OutputKind::String),
    ("homepage", "internet.url", OutputKind::String),
    ("domain", "internet.domainName", OutputKind::String),
    ("ip", "internet.ipv4", OutputKind::String),
    ("ipaddress", "internet.ipv4", OutputKind::String),
    ("useragent", "internet.userAgent", OutputKind::String),
    // Location
    ("address", "location.streetAddress", OutputKind::String),
    ("streetaddress", "location.streetAddress", OutputKind::String),
    ("street", "location.street", OutputKind::String),
    ("city", "location.city", OutputKind::String),
    ("state", "location.state", OutputKind::String),
    ("province", "location.state", OutputKind::String),
    ("country", "location.country", OutputKind::String),
    ("countrycode", "location.countryCode", OutputKind::String),
    ("zip", "location.zipCode", OutputKind::String),
    ("zipcode", "location.zipCode", OutputKind::String),
    ("postalcode", "location.zipCode", OutputKind::String),
    ("postcode", "location.zipCode", OutputKind::String),
    ("latitude", "location.latitude", OutputKind::Number),
    ("lat", "location.latitude", OutputKind::Number),
    ("longitude", "location.longitude", OutputKind::Number),
    ("lng", "location.longitude", OutputKind::Number),
    ("lon", "location.longitude", OutputKind::Number),
    ("coordinates", "location.coordinates", OutputKind::Structured),
    ("location", "location.coordinates", OutputKind::Structured),
    ("timezone", "location.timeZone", OutputKind::String),
    // Content
    ("description", "lorem.paragraph", OutputKind::String),
    ("summary", "lorem.paragraph", OutputKind::String),
    ("content", "lorem.paragraph", OutputKind::String),
    ("comment", "lorem.sentence", OutputKind::String),
    ("message", "lorem.sentence", OutputKind::String),
    ("title", "lorem.sentence", OutputKind::String),
    ("slug", "lorem.slug", OutputKind::String),
    ("avatar", "image.url", OutputKind::String),
    ("image", "image.url", OutputKind::String),
    ("imageurl", "image.url", OutputKind::String),
    ("photo", "image.url", OutputKind::String),
    ("thumbnail", "image.url", OutputKind::String),
    ("filename", "system.fileName", OutputKind::String),
    ("mimetype", "system.mimeType", OutputKind::String),
    ("version", "system.semver", OutputKind::String),
    // Business
    ("company", "company.name", OutputKind::String),
    ("companyname", "company.name", OutputKind::String),
    ("organization", "company.name", OutputKind::String),
    ("industry", "company.industry", OutputKind::String),
    ("department", "company.industry", OutputKind::String),
    ("productname", "commerce.productName", OutputKind::String),
    ("sku", "commerce.sku", OutputKind::String),
    ("price", "commerce.price", OutputKind::Number),
    ("amount", "commerce.price", OutputKind::Number),
    ("cost", "commerce.price", OutputKind::Number),
    ("total", "commerce.price", OutputKind::Number),
    ("quantity", "number.int", OutputKind::Number),
    ("count", "number.int", OutputKind::Number),
    ("currency", "finance.currencyCode", OutputKind::String),
    ("currencycode", "finance.currencyCode", OutputKind::String),
    ("creditcard", "finance.creditCardNumber", OutputKind::String),
    ("accountnumber", "finance.accountNumber", OutputKind::String),
    // Timestamps
    ("createdat", "date.recent", OutputKind::String),
    ("updatedat", "date.recent", OutputKind::String),
    ("deletedat", "date.recent", OutputKind::String),
    ("timestamp", "date.recent", OutputKind::String),
    ("birthdate", "date.birthdate", OutputKind::String),
    ("birthday", "date.birthdate", OutputKind::String),
    ("dateofbirth", "date.birthdate", OutputKind::String),
    ("dob", "date.birthdate", OutputKind::String),
    ("expiresat", "date.future", OutputKind::String),
    // Flags
    ("active", "datatype.boolean", OutputKind::Boolean),
    ("isactive", "datatype.boolean", OutputKind::Boolean),
    ("enabled", "datatype.boolean", OutputKind::Boolean),
    ("verified", "datatype.boolean", OutputKind::Boolean),
    ("isverified", "datatype.boolean", OutputKind::Boolean),
];

/// Lower-case and strip `_`, `-`, `.` and whitespace.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | '.') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Raw table lookup, ignoring the schema.
pub fn lookup(name: &str) -> Option<SmartDefault> {
    let key = normalize_name(name);
    TABLE
        .iter()
        .find(|(entry, _, _)| *entry == key)
        .map(|(_, method, output)| SmartDefault {
            method: *method,
            output: *output,
        })
}

/// Table lookup gated on the schema's declared type.
///
/// A schema without a `type` accepts any entry.
pub fn lookup_for(name: &str, schema: &SchemaNode) -> Option<SmartDefault> {
    let hit = lookup(name)?;
    if schema.schema_type.is_none() || hit.output.is_compatible_with(schema.kind()) {
        Some(hit)
    } else {
        None
    }
}

/// Every (normalized name, method) pair in the table.
pub fn entries() -> impl Iterator<Item = (&'static str, &'static str)> {
    TABLE.iter().map(|(name, method, _)| (*name, *method))
}
