//! Rate extraction.
//!
//! Every `<Package>` of a rate response lists the services offered for that
//! package. Services are aggregated by cleaned name across packages; a
//! service survives only if every package passed its size and weight limits.

use std::collections::HashMap;

use roxmltree::Node;
use tracing::debug;

use super::document::{Document, Payload, child_text, elements};
use crate::api::{AccountType, Options};
use crate::constraints::limits_for_service;
use crate::error::{ResponseError, ResponseErrorKind};
use crate::package::{Package, is_valid};
use crate::request::FirstClassMailType;
use crate::shipment::Rate;

pub(crate) const INVALID_MAIL_TYPE: &str = "Invalid First Class Mail Type.";

/// Element names of one flavour of rate response.
struct ServiceFields {
    service: &'static str,
    code_attribute: &'static str,
    name: &'static str,
    retail: &'static [&'static str],
    commercial_base: &'static [&'static str],
    commercial_plus: &'static [&'static str],
}

const DOMESTIC: ServiceFields = ServiceFields {
    service: "Postage",
    code_attribute: "CLASSID",
    name: "MailService",
    retail: &["Rate"],
    commercial_base: &["CommercialRate", "CommercialPostage"],
    commercial_plus: &["CommercialPlusRate", "CommercialPlusPostage"],
};

const INTERNATIONAL: ServiceFields = ServiceFields {
    service: "Service",
    code_attribute: "ID",
    name: "SvcDescription",
    retail: &["Postage"],
    commercial_base: &["CommercialPostage", "CommercialRate"],
    commercial_plus: &["CommercialPlusPostage", "CommercialPlusRate"],
};

impl ServiceFields {
    fn for_payload(payload: Payload) -> Option<&'static ServiceFields> {
        match payload {
            Payload::DomesticRates => Some(&DOMESTIC),
            Payload::InternationalRates => Some(&INTERNATIONAL),
            Payload::Tracking => None,
        }
    }

    fn price_fields(&self, account: AccountType) -> &'static [&'static str] {
        match account {
            AccountType::Retail => self.retail,
            AccountType::CommercialBase => self.commercial_base,
            AccountType::CommercialPlus => self.commercial_plus,
        }
    }
}

#[derive(Debug)]
struct Aggregate {
    service_code: String,
    package_rates: Vec<i64>,
}

/// Extract rates for `packages` (indexed by the response's `Package ID`).
///
/// Output is sorted ascending by total price; ties keep response order.
pub(crate) fn extract_rates(doc: &Document<'_>, packages: &[Package], options: &Options) -> Result<Vec<Rate>, ResponseError> {
    check_first_class_mail_type(doc, options)?;

    let fields = ServiceFields::for_payload(doc.payload()).ok_or_else(|| {
        doc.error(ResponseErrorKind::UnknownRoot, "expected a rate response, got a tracking response")
    })?;

    let price_fields = fields.price_fields(options.account_type);
    let mut order: Vec<String> = Vec::new();
    let mut services: HashMap<String, Aggregate> = HashMap::new();
    let mut package_count = 0;

    for (position, package_node) in elements(doc.root(), "Package").enumerate() {
        package_count += 1;
        let index = package_node.attribute("ID").and_then(|id| id.trim().parse::<usize>().ok()).unwrap_or(position);
        let package = packages.get(index);

        for service_node in elements(package_node, fields.service) {
            let Some(raw_name) = child_text(service_node, fields.name) else {
                continue;
            };
            let name = clean_service_name(raw_name);

            if let Some(package) = package {
                if !package_valid_for_service(package, &name, service_node, options) {
                    debug!(service = name.as_str(), package = %package, "package exceeds service limits; skipping");
                    continue;
                }
            }

            let cents = price_fields
                .iter()
                .find_map(|field| child_text(service_node, field))
                .and_then(cents_from)
                .unwrap_or(0);

            let entry = services.entry(name.clone()).or_insert_with(|| {
                order.push(name.clone());
                Aggregate {
                    service_code: service_node.attribute(fields.code_attribute).unwrap_or_default().to_string(),
                    package_rates: Vec::new(),
                }
            });
            entry.package_rates.push(cents);
        }
    }

    let mut rates: Vec<Rate> = order
        .into_iter()
        .filter_map(|name| {
            let aggregate = services.remove(&name)?;
            if aggregate.package_rates.len() != package_count {
                debug!(service = name.as_str(), "service not valid for every package; dropping");
                return None;
            }
            let Some(price) = total_cents(&aggregate.package_rates) else {
                debug!(service = name.as_str(), "package rates overflow the total; dropping");
                return None;
            };
            Some(Rate {
                service_code: aggregate.service_code,
                price,
                package_rates: aggregate.package_rates,
                service_name: name,
            })
        })
        .collect();

    if options.account_type != AccountType::Retail {
        supersede_retail_parcels(&mut rates);
    }

    rates.sort_by_key(|rate| rate.price);
    Ok(rates)
}

fn check_first_class_mail_type(doc: &Document<'_>, options: &Options) -> Result<(), ResponseError> {
    let Some(service) = options.service.filter(|s| s.is_first_class()) else {
        return Ok(());
    };

    let accepted = options
        .first_class_mail_type
        .as_deref()
        .and_then(FirstClassMailType::parse)
        .is_some_and(|mail_type| service.first_class_mail_types().contains(&mail_type));

    if accepted { Ok(()) } else { Err(doc.error(ResponseErrorKind::InvalidMailType, INVALID_MAIL_TYPE)) }
}

fn package_valid_for_service(package: &Package, name: &str, node: Node<'_, '_>, options: &Options) -> bool {
    let sentence = child_text(node, "MaxDimensions");
    let max_weight = child_text(node, "MaxWeight").and_then(|w| w.parse::<f64>().ok());

    match limits_for_service(name, sentence, max_weight, options.unmatched_sentence) {
        Ok(spec) => is_valid(package, &spec),
        Err(err) => {
            debug!(service = name, error = %err, "unrecognised limits; rejecting service");
            false
        }
    }
}

/// Strip vendor markup from a service name: escaped tags such as
/// `&lt;sup&gt;&#8482;&lt;/sup&gt;`, a leading `USPS ` and trailing asterisks.
pub(crate) fn clean_service_name(raw: &str) -> String {
    let stripped = regex!(r"&lt;\S*&gt;|<sup>.*?</sup>").replace_all(raw, "");
    let stripped = stripped.trim();
    let stripped = stripped.strip_prefix("USPS ").unwrap_or(stripped).trim_end_matches('*');
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `6.80` → 680. Non-finite values and amounts outside `i64` cents are
/// rejected rather than saturated.
pub(crate) fn cents_from(text: &str) -> Option<i64> {
    let value: f64 = text.trim().parse().ok()?;
    let cents = (value * 100.0).round();
    if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}

fn total_cents(package_rates: &[i64]) -> Option<i64> {
    package_rates.iter().try_fold(0i64, |total, cents| total.checked_add(*cents))
}

/// Physical service behind a retail "Mail Parcel" or commercial "Package
/// Service" name, with the flavour suffix dropped.
fn parcel_family(name: &str) -> Option<(String, bool)> {
    let lower = name.to_lowercase();
    if let Some(base) = lower.strip_suffix(" package service") {
        return Some((base.trim().to_string(), true));
    }
    lower.strip_suffix(" mail parcel").map(|base| (base.trim().to_string(), false))
}

/// Under commercial pricing a priced "Package Service" replaces the retail
/// "Mail Parcel" entry for the same service, which stays listed at zero.
fn supersede_retail_parcels(rates: &mut [Rate]) {
    let commercial: Vec<String> = rates
        .iter()
        .filter(|rate| rate.price > 0)
        .filter_map(|rate| parcel_family(&rate.service_name))
        .filter(|(_, is_package_service)| *is_package_service)
        .map(|(family, _)| family)
        .collect();

    for rate in rates.iter_mut() {
        let superseded = matches!(parcel_family(&rate.service_name), Some((family, false)) if commercial.contains(&family));
        if superseded && rate.price != 0 {
            debug!(service = rate.service_name.as_str(), "retail parcel superseded by package service");
            rate.price = 0;
            rate.package_rates.iter_mut().for_each(|cents| *cents = 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Service;

    const DOMESTIC_RATES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/domestic_rate_response.xml"));
    const INTERNATIONAL_RATES: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/international_rate_response.xml"));
    const TWO_PACKAGES: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/domestic_two_package_rate_response.xml"));

    fn book() -> Package {
        Package::imperial(32.0, [10.0, 7.0, 2.0])
    }

    fn rates_for(body: &str, packages: &[Package], options: &Options) -> Vec<(String, i64)> {
        let doc = Document::parse_str(body).unwrap();
        extract_rates(&doc, packages, options)
            .unwrap()
            .into_iter()
            .map(|rate| (rate.service_name, rate.price))
            .collect()
    }

    fn named(pairs: &[(&str, i64)]) -> Vec<(String, i64)> {
        pairs.iter().map(|(name, price)| (name.to_string(), *price)).collect()
    }

    #[test]
    fn service_name_cleanup() {
        let cases: Vec<(&str, &str)> = vec![
            ("Priority Mail 2-Day", "Priority Mail 2-Day&lt;sup&gt;&#8482;&lt;/sup&gt;"),
            ("First-Class Mail Parcel", "First-Class Mail&lt;sup&gt;&#174;&lt;/sup&gt; Parcel"),
            ("Global Express Guaranteed (GXG)", "USPS Global Express Guaranteed&lt;sup&gt;&#174;&lt;/sup&gt; (GXG)"),
            ("First-Class Package International Service", "First-Class Package International Service**"),
            ("Priority Mail Express", "Priority Mail Express<sup>™</sup>"),
        ];
        for (expected, raw) in cases {
            assert_eq!(clean_service_name(raw), expected, "raw {:?}", raw);
        }
    }

    #[test]
    fn cents_rounding() {
        assert_eq!(cents_from("6.80"), Some(680));
        assert_eq!(cents_from("16.2"), Some(1620));
        assert_eq!(cents_from(" 0.29 "), Some(29));
        assert_eq!(cents_from("n/a"), None);
        assert_eq!(cents_from("1e300"), None);
        assert_eq!(cents_from("-1e300"), None);
        assert_eq!(cents_from("inf"), None);
        assert_eq!(cents_from("NaN"), None);
    }

    #[test]
    fn package_totals_do_not_wrap() {
        assert_eq!(total_cents(&[680, 1620]), Some(2300));
        assert_eq!(total_cents(&[]), Some(0));
        assert_eq!(total_cents(&[i64::MAX - 1, 2]), None);
    }

    #[test]
    fn international_retail_rates() {
        let rates = rates_for(INTERNATIONAL_RATES, &[book()], &Options::default());
        assert_eq!(
            rates,
            named(&[
                ("First-Class Package International Service", 1620),
                ("Priority Mail International", 3875),
                ("Priority Mail Express International", 5290),
                ("Priority Mail International Medium Flat Rate Box", 5995),
                ("Global Express Guaranteed (GXG)", 9760),
            ])
        );
    }

    #[test]
    fn international_commercial_base_rates() {
        let options = Options { account_type: AccountType::CommercialBase, ..Options::default() };
        let rates = rates_for(INTERNATIONAL_RATES, &[book()], &options);
        assert_eq!(
            rates,
            named(&[
                ("Global Express Guaranteed (GXG)", 0),
                ("First-Class Package International Service", 1545),
                ("Priority Mail International", 3645),
                ("Priority Mail Express International", 4995),
                ("Priority Mail International Medium Flat Rate Box", 5633),
            ])
        );
    }

    #[test]
    fn unrecognised_limits_follow_policy() {
        let strict = rates_for(INTERNATIONAL_RATES, &[book()], &Options::default());
        assert!(!strict.iter().any(|(name, _)| name == "GXG Envelopes"));

        let lenient = Options { unmatched_sentence: crate::api::UnmatchedSentence::Unconstrained, ..Options::default() };
        let rates = rates_for(INTERNATIONAL_RATES, &[book()], &lenient);
        assert!(rates.contains(&("GXG Envelopes".to_string(), 8500)));
    }

    #[test]
    fn oversized_package_loses_constrained_services() {
        let crate_sized = Package::imperial(32.0, [30.0, 20.0, 20.0]);
        let rates = rates_for(INTERNATIONAL_RATES, &[crate_sized], &Options::default());
        // 30 + 2 * (20 + 20) = 110 exceeds every girth limit; 70 exceeds the 36" sum.
        assert_eq!(rates, Vec::<(String, i64)>::new());
    }

    #[test]
    fn domestic_retail_rates() {
        let rates = rates_for(DOMESTIC_RATES, &[book()], &Options::default());
        assert_eq!(
            rates,
            named(&[
                ("First-Class Package Service", 0),
                ("First-Class Mail Parcel", 350),
                ("Priority Mail 2-Day", 680),
                ("Standard Post", 1006),
                ("Priority Mail 2-Day Medium Flat Rate Box", 1235),
            ])
        );
    }

    #[test]
    fn domestic_commercial_base_rates() {
        let options = Options { account_type: AccountType::CommercialBase, ..Options::default() };
        let rates = rates_for(DOMESTIC_RATES, &[book()], &options);
        assert_eq!(
            rates,
            named(&[
                ("First-Class Mail Parcel", 0),
                ("Standard Post", 0),
                ("First-Class Package Service", 288),
                ("Priority Mail 2-Day", 605),
                ("Priority Mail 2-Day Medium Flat Rate Box", 1130),
            ])
        );
    }

    #[test]
    fn commercial_package_service_supersedes_retail_parcel() {
        let options = Options { account_type: AccountType::CommercialPlus, ..Options::default() };
        let rates = rates_for(DOMESTIC_RATES, &[book()], &options);

        let price_of = |name: &str| rates.iter().find(|(n, _)| n == name).map(|(_, p)| *p);
        assert_eq!(price_of("First-Class Package Service"), Some(275));
        // The fixture carries a commercial plus price on the retail parcel too.
        assert_eq!(price_of("First-Class Mail Parcel"), Some(0));
        assert_eq!(price_of("Priority Mail 2-Day"), Some(590));
    }

    #[test]
    fn rates_are_summed_over_packages() {
        let small = Package::imperial(16.0, [8.0, 6.0, 2.0]);
        let large = Package::imperial(48.0, [16.0, 12.0, 10.0]);

        let doc = Document::parse_str(TWO_PACKAGES).unwrap();
        let rates = extract_rates(&doc, &[small, large], &Options::default()).unwrap();

        // The flat rate box only fits the small package, so it is dropped.
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0].service_name, "Priority Mail 2-Day");
        assert_eq!(rates[0].service_code, "1");
        assert_eq!(rates[0].package_rates, vec![680, 1215]);
        assert_eq!(rates[0].price, 1895);
    }

    #[test]
    fn first_class_requires_a_matching_mail_type() {
        let doc = Document::parse_str(DOMESTIC_RATES).unwrap();

        let missing = Options { service: Some(Service::FirstClass), ..Options::default() };
        let err = extract_rates(&doc, &[book()], &missing).unwrap_err();
        assert_eq!(err.kind, ResponseErrorKind::InvalidMailType);
        assert_eq!(err.message, "Invalid First Class Mail Type.");
        assert_eq!(err.response, DOMESTIC_RATES);

        let wrong = Options {
            service: Some(Service::FirstClassCommercial),
            first_class_mail_type: Some("letter".to_string()),
            ..Options::default()
        };
        assert!(extract_rates(&doc, &[book()], &wrong).is_err());

        let bogus = Options {
            service: Some(Service::FirstClass),
            first_class_mail_type: Some("crate".to_string()),
            ..Options::default()
        };
        assert!(extract_rates(&doc, &[book()], &bogus).is_err());

        let fine = Options {
            service: Some(Service::FirstClass),
            first_class_mail_type: Some("parcel".to_string()),
            ..Options::default()
        };
        assert!(extract_rates(&doc, &[book()], &fine).is_ok());

        let not_first_class = Options { service: Some(Service::Priority), ..Options::default() };
        assert!(extract_rates(&doc, &[book()], &not_first_class).is_ok());
    }

    #[test]
    fn tracking_document_is_not_a_rate_response() {
        let doc = Document::parse_str("<TrackResponse><TrackInfo ID=\"1\"/></TrackResponse>").unwrap();
        let err = extract_rates(&doc, &[], &Options::default()).unwrap_err();
        assert_eq!(err.kind, ResponseErrorKind::UnknownRoot);
    }
}
