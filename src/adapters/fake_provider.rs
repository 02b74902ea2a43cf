//! Seeded fake-data provider addressed by hierarchical method paths
//!
//! Methods are named `module.method` (`person.firstName`, `internet.email`) and
//! all draw from the provider's own seeded random source, so two providers
//! built from the same seed produce the same sequence.

use chrono::{DateTime, SecondsFormat, Utc};
use fake::faker::address::en::{
    BuildingNumber, CityName, CountryCode, CountryName, StateName, StreetName, TimeZone, ZipCode,
};
use fake::faker::company::en::{Buzzword, CatchPhrase, CompanyName, Industry};
use fake::faker::creditcard::en::CreditCardNumber;
use fake::faker::currency::en::{CurrencyCode, CurrencyName};
use fake::faker::filesystem::en::{FileExtension, FileName, MimeType};
use fake::faker::internet::en::{
    DomainSuffix, IPv4, IPv6, MACAddress, Password, SafeEmail, UserAgent, Username,
};
use fake::faker::job::en::Title as JobTitle;
use fake::faker::lorem::en::{Paragraph, Sentence, Word, Words};
use fake::faker::name::en::{FirstName, LastName, Name, Title as NamePrefix};
use fake::faker::phone_number::en::{CellNumber, PhoneNumber};
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use crate::domain::GenerationError;

/// Fixed "now" for relative dates (2024-01-01T00:00:00Z), keeping output a
/// function of the seed alone.
pub const REFERENCE_TIMESTAMP: i64 = 1_704_067_200;

const DAY_SECONDS: i64 = 86_400;

pub type FakeMethod = fn(&mut StdRng) -> Value;

/// Owner of the random source for one generation run.
pub struct FakeProvider {
    rng: StdRng,
}

impl FakeProvider {
    /// Seeded provider; `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Fair seeded coin.
    pub fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Resolve a method path to the function implementing it.
    pub fn resolve(path: &str) -> Option<FakeMethod> {
        METHODS
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, method)| *method)
    }

    /// Resolve and invoke a method path.
    pub fn invoke(&mut self, path: &str) -> Result<Value, GenerationError> {
        let method = Self::resolve(path).ok_or_else(|| GenerationError::UnresolvableGeneratorPath {
            path: path.to_string(),
        })?;
        Ok(method(&mut self.rng))
    }

    /// Every available method path, in catalogue order.
    pub fn methods() -> impl Iterator<Item = &'static str> {
        METHODS.iter().map(|(name, _)| *name)
    }
}

static METHODS: &[(&str, FakeMethod)] = &[
    // Person
    ("person.firstName", person_first_name),
    ("person.lastName", person_last_name),
    ("person.fullName", person_full_name),
    ("person.prefix", person_prefix),
    ("person.jobTitle", person_job_title),
    ("person.age", person_age),
    ("person.bio", person_bio),
    // Internet
    ("internet.email", internet_email),
    ("internet.userName", internet_user_name),
    ("internet.password", internet_password),
    ("internet.url", internet_url),
    ("internet.domainName", internet_domain_name),
    ("internet.ipv4", internet_ipv4),
    ("internet.ipv6", internet_ipv6),
    ("internet.mac", internet_mac),
    ("internet.userAgent", internet_user_agent),
    // Phone
    ("phone.number", phone_number),
    ("phone.cell", phone_cell),
    // Location
    ("location.streetAddress", location_street_address),
    ("location.street", location_street),
    ("location.city", location_city),
    ("location.state", location_state),
    ("location.country", location_country),
    ("location.countryCode", location_country_code),
    ("location.zipCode", location_zip_code),
    ("location.latitude", location_latitude),
    ("location.longitude", location_longitude),
    ("location.coordinates", location_coordinates),
    ("location.timeZone", location_time_zone),
    // Company / commerce / finance
    ("company.name", company_name),
    ("company.industry", company_industry),
    ("company.catchPhrase", company_catch_phrase),
    ("company.buzzword", company_buzzword),
    ("commerce.price", commerce_price),
    ("commerce.productName", commerce_product_name),
    ("commerce.sku", commerce_sku),
    ("finance.currencyCode", finance_currency_code),
    ("finance.currencyName", finance_currency_name),
    ("finance.creditCardNumber", finance_credit_card_number),
    ("finance.accountNumber", finance_account_number),
    // Text
    ("lorem.word", lorem_word),
    ("lorem.words", lorem_words),
    ("lorem.sentence", lorem_sentence),
    ("lorem.paragraph", lorem_paragraph),
    ("lorem.slug", lorem_slug),
    // Primitives
    ("string.uuid", string_uuid),
    ("string.alphanumeric", string_alphanumeric),
    ("number.int", number_int),
    ("number.float", number_float),
    ("datatype.boolean", datatype_boolean),
    // Dates
    ("date.past", date_past),
    ("date.future", date_future),
    ("date.recent", date_recent),
    ("date.birthdate", date_birthdate),
    // Media / files
    ("image.url", image_url),
    ("system.fileName", system_file_name),
    ("system.fileExtension", system_file_extension),
    ("system.mimeType", system_mime_type),
    ("system.semver", system_semver),
];

// ============================================================================
// Shared helpers
// ============================================================================

pub(crate) fn random_uuid(rng: &mut StdRng) -> String {
    uuid::Builder::from_random_bytes(rng.gen::<[u8; 16]>())
        .into_uuid()
        .to_string()
}

/// Uniform instant within `[from, to]` seconds relative to the reference time.
pub(crate) fn random_datetime(rng: &mut StdRng, from: i64, to: i64) -> DateTime<Utc> {
    let offset = if from < to { rng.gen_range(from..=to) } else { from };
    DateTime::from_timestamp(REFERENCE_TIMESTAMP + offset, 0).unwrap_or_default()
}

pub(crate) fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

pub(crate) fn domain_name(rng: &mut StdRng) -> String {
    let word: String = Word().fake_with_rng(rng);
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    format!("{}.{}", word.to_lowercase(), suffix)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn digits(rng: &mut StdRng, count: usize) -> String {
    (0..count)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

// ============================================================================
// Methods
// ============================================================================

fn person_first_name(rng: &mut StdRng) -> Value {
    json!(FirstName().fake_with_rng::<String, _>(rng))
}

fn person_last_name(rng: &mut StdRng) -> Value {
    json!(LastName().fake_with_rng::<String, _>(rng))
}

fn person_full_name(rng: &mut StdRng) -> Value {
    json!(Name().fake_with_rng::<String, _>(rng))
}

fn person_prefix(rng: &mut StdRng) -> Value {
    json!(NamePrefix().fake_with_rng::<String, _>(rng))
}

fn person_job_title(rng: &mut StdRng) -> Value {
    json!(JobTitle().fake_with_rng::<String, _>(rng))
}

fn person_age(rng: &mut StdRng) -> Value {
    json!(rng.gen_range(18..=90))
}

fn person_bio(rng: &mut StdRng) -> Value {
    json!(Sentence(6..14).fake_with_rng::<String, _>(rng))
}

fn internet_email(rng: &mut StdRng) -> Value {
    json!(SafeEmail().fake_with_rng::<String, _>(rng))
}

fn internet_user_name(rng: &mut StdRng) -> Value {
    json!(Username().fake_with_rng::<String, _>(rng))
}

fn internet_password(rng: &mut StdRng) -> Value {
    json!(Password(10..17).fake_with_rng::<String, _>(rng))
}

fn internet_url(rng: &mut StdRng) -> Value {
    let domain = domain_name(rng);
    let path: String = Word().fake_with_rng(rng);
    json!(format!("https://{}/{}", domain, path))
}

fn internet_domain_name(rng: &mut StdRng) -> Value {
    json!(domain_name(rng))
}

fn internet_ipv4(rng: &mut StdRng) -> Value {
    json!(IPv4().fake_with_rng::<String, _>(rng))
}

fn internet_ipv6(rng: &mut StdRng) -> Value {
    json!(IPv6().fake_with_rng::<String, _>(rng))
}

fn internet_mac(rng: &mut StdRng) -> Value {
    json!(MACAddress().fake_with_rng::<String, _>(rng))
}

fn internet_user_agent(rng: &mut StdRng) -> Value {
    json!(UserAgent().fake_with_rng::<String, _>(rng))
}

fn phone_number(rng: &mut StdRng) -> Value {
    json!(PhoneNumber().fake_with_rng::<String, _>(rng))
}

fn phone_cell(rng: &mut StdRng) -> Value {
    json!(CellNumber().fake_with_rng::<String, _>(rng))
}

fn location_street_address(rng: &mut StdRng) -> Value {
    let number: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    json!(format!("{} {}", number, street))
}

fn location_street(rng: &mut StdRng) -> Value {
    json!(StreetName().fake_with_rng::<String, _>(rng))
}

fn location_city(rng: &mut StdRng) -> Value {
    json!(CityName().fake_with_rng::<String, _>(rng))
}

fn location_state(rng: &mut StdRng) -> Value {
    json!(StateName().fake_with_rng::<String, _>(rng))
}

fn location_country(rng: &mut StdRng) -> Value {
    json!(CountryName().fake_with_rng::<String, _>(rng))
}

fn location_country_code(rng: &mut StdRng) -> Value {
    json!(CountryCode().fake_with_rng::<String, _>(rng))
}

fn location_zip_code(rng: &mut StdRng) -> Value {
    json!(ZipCode().fake_with_rng::<String, _>(rng))
}

fn location_latitude(rng: &mut StdRng) -> Value {
    json!(round_to(rng.gen_range(-90.0..=90.0), 6))
}

fn location_longitude(rng: &mut StdRng) -> Value {
    json!(round_to(rng.gen_range(-180.0..=180.0), 6))
}

fn location_coordinates(rng: &mut StdRng) -> Value {
    let latitude = location_latitude(rng);
    let longitude = location_longitude(rng);
    json!({ "latitude": latitude, "longitude": longitude })
}

fn location_time_zone(rng: &mut StdRng) -> Value {
    json!(TimeZone().fake_with_rng::<String, _>(rng))
}

fn company_name(rng: &mut StdRng) -> Value {
    json!(CompanyName().fake_with_rng::<String, _>(rng))
}

fn company_industry(rng: &mut StdRng) -> Value {
    json!(Industry().fake_with_rng::<String, _>(rng))
}

fn company_catch_phrase(rng: &mut StdRng) -> Value {
    json!(CatchPhrase().fake_with_rng::<String, _>(rng))
}

fn company_buzzword(rng: &mut StdRng) -> Value {
    json!(Buzzword().fake_with_rng::<String, _>(rng))
}

fn commerce_price(rng: &mut StdRng) -> Value {
    json!(round_to(rng.gen_range(1.0..1000.0), 2))
}

fn commerce_product_name(rng: &mut StdRng) -> Value {
    let buzzword: String = Buzzword().fake_with_rng(rng);
    let word: String = Word().fake_with_rng(rng);
    json!(format!("{} {}", buzzword, word))
}

fn commerce_sku(rng: &mut StdRng) -> Value {
    let letters: String = (0..3)
        .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
        .collect();
    json!(format!("{}-{}", letters, digits(rng, 6)))
}

fn finance_currency_code(rng: &mut StdRng) -> Value {
    json!(CurrencyCode().fake_with_rng::<String, _>(rng))
}

fn finance_currency_name(rng: &mut StdRng) -> Value {
    json!(CurrencyName().fake_with_rng::<String, _>(rng))
}

fn finance_credit_card_number(rng: &mut StdRng) -> Value {
    json!(CreditCardNumber().fake_with_rng::<String, _>(rng))
}

fn finance_account_number(rng: &mut StdRng) -> Value {
    json!(digits(rng, 10))
}

fn lorem_word(rng: &mut StdRng) -> Value {
    json!(Word().fake_with_rng::<String, _>(rng))
}

fn lorem_words(rng: &mut StdRng) -> Value {
    let words: Vec<String> = Words(2..6).fake_with_rng(rng);
    json!(words.join(" "))
}

fn lorem_sentence(rng: &mut StdRng) -> Value {
    json!(Sentence(3..10).fake_with_rng::<String, _>(rng))
}

fn lorem_paragraph(rng: &mut StdRng) -> Value {
    json!(Paragraph(1..4).fake_with_rng::<String, _>(rng))
}

fn lorem_slug(rng: &mut StdRng) -> Value {
    let words: Vec<String> = Words(2..5).fake_with_rng(rng);
    json!(words.join("-").to_lowercase())
}

fn string_uuid(rng: &mut StdRng) -> Value {
    json!(random_uuid(rng))
}

fn string_alphanumeric(rng: &mut StdRng) -> Value {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let s: String = (0..10)
        .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
        .collect();
    json!(s)
}

fn number_int(rng: &mut StdRng) -> Value {
    json!(rng.gen_range(0..=1000))
}

fn number_float(rng: &mut StdRng) -> Value {
    json!(round_to(rng.gen_range(0.0..1000.0), 2))
}

fn datatype_boolean(rng: &mut StdRng) -> Value {
    json!(rng.gen_bool(0.5))
}

fn date_past(rng: &mut StdRng) -> Value {
    json!(format_datetime(random_datetime(rng, -365 * DAY_SECONDS, 0)))
}

fn date_future(rng: &mut StdRng) -> Value {
    json!(format_datetime(random_datetime(rng, 0, 365 * DAY_SECONDS)))
}

fn date_recent(rng: &mut StdRng) -> Value {
    json!(format_datetime(random_datetime(rng, -7 * DAY_SECONDS, 0)))
}

fn date_birthdate(rng: &mut StdRng) -> Value {
    let dt = random_datetime(rng, -80 * 365 * DAY_SECONDS, -18 * 365 * DAY_SECONDS);
    json!(format_date(dt))
}

fn image_url(rng: &mut StdRng) -> Value {
    let seed: String = Word().fake_with_rng(rng);
    json!(format!("https://picsum.photos/seed/{}/640/480", seed.to_lowercase()))
}

fn system_file_name(rng: &mut StdRng) -> Value {
    json!(FileName().fake_with_rng::<String, _>(rng))
}

fn system_file_extension(rng: &mut StdRng) -> Value {
    json!(FileExtension().fake_with_rng::<String, _>(rng))
}

fn system_mime_type(rng: &mut StdRng) -> Value {
    json!(MimeType().fake_with_rng::<String, _>(rng))
}

fn system_semver(rng: &mut StdRng) -> Value {
    let major = rng.gen_range(0..10);
    let minor = rng.gen_range(0..20);
    let patch = rng.gen_range(0..50);
    json!(format!("{}.{}.{}", major, minor, patch))
}

// ============================================================================
// Tests
// ============================================================================
