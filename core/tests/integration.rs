//! End-to-end calls against the live mock Bot API.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Bot` over real HTTP
//! with the default ureq transport. Validates request building, transport and
//! envelope decoding together.

use std::net::SocketAddr;

use mock_server::MockBotApi;
use tgbot_core::{
    Bot, ClientError, Configuration, Envelope, GetUpdates, Params, SendMessage, Update, User,
};

const TOKEN: &str = "123456:TEST-TOKEN";

/// Start the mock server on a random port in a background runtime.
fn start_server(api: MockBotApi) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, api).await
        })
        .unwrap();
    });

    addr
}

fn bot(addr: SocketAddr) -> Bot {
    Bot::with_base_url(&format!("http://{addr}"), TOKEN).unwrap()
}

#[test]
fn bot_lifecycle() {
    let api = MockBotApi::new(TOKEN);
    let addr = start_server(api.clone());
    let bot = bot(addr);

    // Step 1: identity check.
    let me = bot.get_me().unwrap();
    assert!(me.ok);
    let user = me.result.unwrap();
    assert_eq!(user.id, 123456);
    assert!(user.is_bot);

    // Step 2: no updates yet.
    let updates = bot.get_updates(&GetUpdates::default()).unwrap();
    assert!(updates.result.unwrap().is_empty(), "expected no updates");

    // Step 3: two users write to the bot.
    api.push_text_update(501, "hello");
    api.push_text_update(502, "/start");

    let updates = bot.get_updates(&GetUpdates::default()).unwrap().result.unwrap();
    assert_eq!(updates.len(), 2);
    let first = updates[0].message.as_ref().unwrap();
    assert_eq!(first.chat.id, 501);
    assert_eq!(first.text.as_deref(), Some("hello"));

    // Step 4: reply to the first one.
    let mut reply = SendMessage::new(501, "hi there");
    reply.reply_to_message_id = Some(first.message_id);
    let sent = bot.send_message(&reply).unwrap().result.unwrap();
    assert_eq!(sent.chat.id, 501);
    assert_eq!(sent.text.as_deref(), Some("hi there"));
    assert_eq!(api.sent_messages().len(), 1);

    // Step 5: confirm the first update by asking for the next offset.
    let next = GetUpdates {
        offset: Some(updates[0].update_id + 1),
        ..GetUpdates::default()
    };
    let remaining = bot.get_updates(&next).unwrap().result.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].update_id, updates[1].update_id);

    // Step 6: rejected call comes back as an envelope, not an error.
    let rejected = bot.send_message(&SendMessage::new(501, "")).unwrap();
    assert!(!rejected.ok);
    assert_eq!(rejected.error_code, Some(400));
    assert_eq!(
        rejected.description.as_deref(),
        Some("Bad Request: message text is empty")
    );
    assert!(rejected.result.is_none());
}

#[test]
fn file_download_flow() {
    let api = MockBotApi::new(TOKEN);
    api.add_file("photo-1", "photos/file_1.jpg", &[0xff, 0xd8, 0xff, 0xe0]);
    let bot = bot(start_server(api));

    let file = bot.get_file("photo-1").unwrap().result.unwrap();
    assert_eq!(file.file_size, Some(4));
    let path = file.file_path.unwrap();
    assert_eq!(path, "photos/file_1.jpg");

    let bytes = bot.download_file(&path).unwrap();
    assert_eq!(bytes, vec![0xff, 0xd8, 0xff, 0xe0]);

    let err = bot.download_file("photos/missing.jpg").unwrap_err();
    assert!(matches!(err, ClientError::Download { status: 404 }));

    let missing = bot.get_file("nope").unwrap();
    assert!(!missing.ok);
    assert_eq!(missing.description.as_deref(), Some("Bad Request: invalid file_id"));
}

#[test]
fn empty_params_send_no_body_and_no_content_type() {
    let api = MockBotApi::new(TOKEN);
    let bot = bot(start_server(api.clone()));

    bot.get_me().unwrap();
    bot.send_message(&SendMessage::new(1, "x")).unwrap();

    let requests = api.requests();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].api_method, "getMe");
    assert_eq!(requests[0].http_method, "GET");
    assert!(requests[0].body.is_empty());
    assert_eq!(requests[0].content_type, None);

    assert_eq!(requests[1].http_method, "POST");
    assert_eq!(requests[1].content_type.as_deref(), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body, serde_json::json!({"chat_id": 1, "text": "x"}));
    assert!(!requests[1].body.contains(TOKEN));
}

#[test]
fn rate_limit_hint_is_surfaced_not_acted_on() {
    let api = MockBotApi::new(TOKEN);
    api.rate_limit_next(5);
    let bot = bot(start_server(api.clone()));

    let env = bot.get_me().unwrap();
    assert!(!env.ok);
    assert_eq!(env.error_code, Some(429));
    assert_eq!(env.retry_after(), Some(5));
    assert!(env.result.is_none());
    assert_eq!(api.requests().len(), 1, "no automatic retry");

    assert!(bot.get_me().unwrap().ok);
}

#[test]
fn wrong_token_is_an_application_failure() {
    let addr = start_server(MockBotApi::new(TOKEN));
    let bot = Bot::with_base_url(&format!("http://{addr}"), "999:WRONG").unwrap();

    let env = bot.get_me().unwrap();
    assert!(!env.ok);
    assert_eq!(env.error_code, Some(401));
    let failure = env.into_result().unwrap_err();
    assert_eq!(failure.description, "Unauthorized");
}

#[test]
fn generic_invocation_shapes() {
    let api = MockBotApi::new(TOKEN);
    api.push_text_update(9, "ping");
    let bot = bot(start_server(api));

    let me: Envelope<User> = bot
        .invoke("getMe", &Params::new(), &Configuration::empty())
        .unwrap();
    assert_eq!(me.result.unwrap().username.as_deref(), Some("mock_bot"));

    let raw = bot
        .invoke_map("getMe", &Params::new(), &Configuration::empty())
        .unwrap();
    assert_eq!(raw.result.unwrap()["first_name"], "Mock Bot");

    let list = bot
        .invoke_list::<Update>("getUpdates", &Params::new(), &Configuration::empty())
        .unwrap();
    assert_eq!(list.result.unwrap().len(), 1);

    let unknown: Envelope<serde_json::Value> = bot
        .invoke("launchRockets", &Params::new(), &Configuration::empty())
        .unwrap();
    assert!(!unknown.ok);
    assert_eq!(unknown.error_code, Some(404));
}

#[test]
fn pretty_printed_bodies_are_still_valid_json() {
    let api = MockBotApi::new(TOKEN);
    let bot = bot(start_server(api.clone())).with_config(Configuration::empty().pretty_json(true));

    let sent = bot.send_message(&SendMessage::new(3, "pretty")).unwrap();
    assert!(sent.ok);
    let requests = api.requests();
    assert!(requests[0].body.contains('\n'));
}

#[test]
fn concurrent_calls_share_one_bot() {
    let api = MockBotApi::new(TOKEN);
    let bot = bot(start_server(api.clone()));

    let handles: Vec<_> = (0..8i64)
        .map(|i| {
            let bot = bot.clone();
            std::thread::spawn(move || bot.send_message(&SendMessage::new(i, format!("msg {i}"))))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().unwrap().ok);
    }
    assert_eq!(api.sent_messages().len(), 8);
}

#[test]
fn unreachable_host_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let bot = Bot::with_base_url(&format!("http://127.0.0.1:{port}"), TOKEN).unwrap();

    let err = bot.get_me().unwrap_err();
    assert!(matches!(err, ClientError::Transport { ref method, .. } if method == "getMe"));
}
