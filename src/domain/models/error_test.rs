use super::ChatError;

#[test]
fn it_suggests_checking_the_server_on_network_errors() {
    let err = ChatError::Network("connection refused".to_string());
    insta::assert_snapshot!(err.user_message(), @r###"
    Sorry, something went wrong.

    I couldn't reach the chat server. Check that the server is running and reachable.

    connection refused
    "###);
}

#[test]
fn it_includes_status_on_server_errors() {
    let err = ChatError::Server {
        status: 500,
        message: "upstream exploded".to_string(),
    };
    assert!(err.user_message().contains("status 500"));
    assert!(err.user_message().contains("upstream exploded"));
}

#[test]
fn it_describes_each_kind_differently() {
    let messages = [
        ChatError::Network("x".to_string()).user_message(),
        ChatError::Server {
            status: 502,
            message: "x".to_string(),
        }
        .user_message(),
        ChatError::Protocol("x".to_string()).user_message(),
        ChatError::Encoding("x".to_string()).user_message(),
        ChatError::Persistence("x".to_string()).user_message(),
    ];

    for (idx, message) in messages.iter().enumerate() {
        for other in messages.iter().skip(idx + 1) {
            assert_ne!(message, other);
        }
    }
}

#[test]
fn it_displays_kind_prefix() {
    let err = ChatError::Encoding("bad data uri".to_string());
    assert_eq!(err.to_string(), "encoding error: bad data uri");
}
