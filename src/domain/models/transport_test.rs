use super::TransportName;

#[test]
fn it_parses_transport_names() {
    assert_eq!(
        TransportName::parse("proxy".to_string()),
        Some(TransportName::Proxy)
    );
    assert_eq!(
        TransportName::parse("function".to_string()),
        Some(TransportName::Function)
    );
    assert_eq!(TransportName::parse("carrier-pigeon".to_string()), None);
}

#[test]
fn it_displays_lowercase() {
    assert_eq!(TransportName::Function.to_string(), "function");
}
