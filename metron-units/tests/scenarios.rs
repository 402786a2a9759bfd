use std::sync::Arc;
use metron_units::{load_all, Converter, ErrorKind, Number, GENERIC_GUIDANCE};

fn converter() -> Converter {
    Converter::new(Arc::new(load_all().unwrap()))
}

fn n(s: &str) -> Number {
    Number::from_str(s).unwrap()
}

#[test]
fn meter_to_foot() {
    let r = converter().convert(1.0, "meter", "foot");
    assert!(r.is_success());
    assert!((r.as_f64().unwrap() - 3.28084).abs() < 1e-5);
    assert_eq!(r.formatted.as_deref(), Some("3.28084"));
}

#[test]
fn cfm_to_cubic_meters_per_hour() {
    let r = converter().convert(100.0, "cfm", "m3/h");
    assert_eq!(r.value, Some(n("169.901079552")));
    assert_eq!(r.formatted.as_deref(), Some("169.9011"));
    assert_eq!(r.category.as_deref(), Some("airflow"));
}

#[test]
fn celsius_to_fahrenheit_is_exact() {
    let r = converter().convert_from_input("20 degC to degF");
    assert_eq!(r.value, Some(n("68")));
    assert_eq!(r.as_f64(), Some(68.0));
}

#[test]
fn missing_target_is_invalid_format() {
    let r = converter().convert_from_input("5 meters");
    let err = r.error.unwrap();
    assert_eq!(err.kind, ErrorKind::InvalidFormat);
    assert!(!err.suggestions().is_empty());
}

#[test]
fn cross_category_names_both_categories() {
    let err = converter().convert(1.0, "meter", "gallon").error.unwrap();
    assert_eq!(err.kind, ErrorKind::InvalidFormat);
    assert!(err.message.contains("length"));
    assert!(err.message.contains("volume"));
}

#[test]
fn typo_suggests_closest_unit() {
    let err = converter().convert(1.0, "mter", "foot").error.unwrap();
    assert_eq!(err.kind, ErrorKind::UnknownUnit);
    assert_eq!(err.suggestions().first().map(String::as_str), Some("meter"));
    assert!(err.render().contains("\nSuggestions:\n  - meter"));
}

#[test]
fn gibberish_gets_generic_guidance() {
    let err = converter().convert(1.0, "xyzabc123", "foot").error.unwrap();
    assert_eq!(err.kind, ErrorKind::UnknownUnit);
    assert_eq!(err.suggestions(), &[GENERIC_GUIDANCE.to_string()]);
}

#[test]
fn aliases_ignore_case_and_glyphs() {
    let c = converter();
    for (source, target) in [("METERS", "Feet"), ("Meter", "FT"), ("metre", "'")] {
        let r = c.convert(1.0, source, target);
        assert_eq!(r.formatted.as_deref(), Some("3.28084"), "{} -> {}", source, target);
    }
    assert_eq!(c.convert_from_input("0 °C to °F").value, Some(n("32")));
    assert_eq!(c.convert(1.0, "Å", "nm").value, Some(n("0.1")));
    assert_eq!(c.convert(1.0, "µm", "mm").value, Some(n("0.001")));
    assert_eq!(c.convert(1.0, "m²", "sq ft").formatted.as_deref(), Some("10.76391"));
}

#[test]
fn r_value_and_u_value_are_reciprocal() {
    let c = converter();
    // R-13 insulation
    let rsi = c.convert(13.0, "r-value", "rsi");
    assert_eq!(rsi.formatted.as_deref(), Some("2.28943"));
    let u = c.convert_number(rsi.value.as_ref().unwrap(), "rsi", "u-value");
    assert_eq!(u.formatted.as_deref(), Some("0.436789"));
    let u_ip = c.convert(13.0, "r-value", "u-ip");
    assert!((u_ip.as_f64().unwrap() - 1.0 / 13.0).abs() < 1e-9);
}

#[test]
fn fractions_and_mixed_numbers() {
    let c = converter();
    assert_eq!(c.convert_from_input("1 1/2 gallons to liters").formatted.as_deref(), Some("5.67812"));
    assert_eq!(c.convert_from_input("3/4 inch to mm").value, Some(n("19.05")));
    assert_eq!(
        c.convert_from_input("1/0 inch to mm").error.map(|e| e.kind),
        Some(ErrorKind::InvalidFormat)
    );
}

#[test]
fn formatting_switches_to_exponential() {
    let c = converter();
    assert_eq!(c.convert(1.0, "joule", "eV").formatted.as_deref(), Some("6.241509e18"));
    assert_eq!(c.convert(1.0, "nm", "km").formatted.as_deref(), Some("1e-12"));
    assert_eq!(c.convert(0.0, "km", "m").formatted.as_deref(), Some("0"));
}

#[test]
fn validate_conversion_is_a_cheap_check() {
    let c = converter();
    let (from, to) = c.validate_conversion("lbs", "kilos").unwrap();
    assert_eq!(from.unit, "pound");
    assert_eq!(to.unit, "kilogram");
    assert_eq!(c.validate_conversion("lbs", "psi").unwrap_err().kind, ErrorKind::InvalidFormat);
}

#[test]
fn extreme_magnitudes_survive_json() {
    let c = converter();
    for input in ["1e-30 m to ft", "1e20000000 m to ft"] {
        let r = c.convert_from_input(input);
        assert!(r.is_success(), "{}", input);

        let json = serde_json::to_string(&r).unwrap();
        assert!(json.len() < 1000, "{} serialized to {} bytes", input, json.len());

        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        let value: Number = serde_json::from_value(doc["value"].clone()).unwrap();
        let input_value: Number = serde_json::from_value(doc["inputValue"].clone()).unwrap();
        assert_eq!(Some(value), r.value, "{}", input);
        assert_eq!(Some(input_value), r.input_value, "{}", input);
    }

    let tiny = c.convert_from_input("1e-30 m to ft");
    let doc = serde_json::to_value(&tiny).unwrap();
    assert_eq!(doc["inputValue"], "0.000000000000000000000000000001");
    assert_ne!(doc["value"], "0");
}
