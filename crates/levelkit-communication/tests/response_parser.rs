use levelkit_communication::firmware::grbl::response_parser::*;

#[test]
fn test_parse_ok() {
    let parser = GrblResponseParser::new();
    assert_eq!(parser.parse("ok"), Some(GrblResponse::Ok));
    assert_eq!(parser.parse("  ok\r"), Some(GrblResponse::Ok));
}

#[test]
fn test_parse_empty_line() {
    let parser = GrblResponseParser::new();
    assert_eq!(parser.parse("   "), None);
}

#[test]
fn test_parse_error() {
    let parser = GrblResponseParser::new();
    assert_eq!(parser.parse("error:1"), Some(GrblResponse::Error(1)));
    assert_eq!(parser.parse("error:23"), Some(GrblResponse::Error(23)));
}

#[test]
fn test_parse_alarm_either_case() {
    let parser = GrblResponseParser::new();
    assert_eq!(parser.parse("ALARM:4"), Some(GrblResponse::Alarm(4)));
    assert_eq!(parser.parse("alarm:6"), Some(GrblResponse::Alarm(6)));
}

#[test]
fn test_parse_probe_report() {
    let parser = GrblResponseParser::new();
    let response = parser.parse("[PRB:10.000,20.000,-1.250:1]");

    assert_eq!(
        response,
        Some(GrblResponse::Probe(ProbeReport {
            x: 10.0,
            y: 20.0,
            z: -1.25,
            a: None,
            success: true,
        }))
    );
}

#[test]
fn test_parse_failed_probe_report() {
    let parser = GrblResponseParser::new();
    match parser.parse("[PRB:0.000,0.000,0.000:0]") {
        Some(GrblResponse::Probe(report)) => assert!(!report.success),
        other => panic!("expected probe report, got {:?}", other),
    }
}

#[test]
fn test_malformed_probe_report_is_a_message() {
    let parser = GrblResponseParser::new();
    assert_eq!(
        parser.parse("[PRB:abc]"),
        Some(GrblResponse::Message("[PRB:abc]".to_string()))
    );
}

#[test]
fn test_parse_setting() {
    let parser = GrblResponseParser::new();
    assert_eq!(
        parser.parse("$110=500.000"),
        Some(GrblResponse::Setting {
            number: 110,
            value: "500.000".to_string()
        })
    );
}

#[test]
fn test_parse_version() {
    let parser = GrblResponseParser::new();
    assert!(matches!(
        parser.parse("Grbl 1.1h ['$' for help]"),
        Some(GrblResponse::Version(_))
    ));
}

#[test]
fn test_descriptions() {
    assert_eq!(GrblResponseParser::error_description(20), "Unsupported or invalid g-code command");
    assert_eq!(GrblResponseParser::alarm_description(5), "Probe not triggered");
    assert_eq!(GrblResponseParser::alarm_description(99), "Unknown alarm");
}
