/// A 1x1 transparent PNG, base64 encoded.
pub const PNG_FIXTURE_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub fn png_data_uri() -> String {
    return format!("data:image/png;base64,{PNG_FIXTURE_BASE64}");
}

/// A conversation log as it would be written by a previous run.
pub fn stored_conversation_fixture() -> &'static str {
    return r#"
[
  {
    "id": "1700000000000",
    "role": "user",
    "content": "What is in this picture?",
    "imageRef": "file:///tmp/cat.jpg"
  },
  {
    "id": "1700000000001",
    "role": "assistant",
    "content": "A cat sleeping on a keyboard."
  },
  {
    "id": "1700000000002",
    "role": "user",
    "content": "Is it comfortable?"
  },
  {
    "id": "1700000000003",
    "role": "assistant",
    "content": "Sorry, something went wrong.",
    "kind": "error"
  }
]
"#
    .trim();
}
