//! End-to-end binding through `HttpClient` with an in-memory transport.

use std::collections::BTreeMap;
use std::sync::{Arc, Barrier};
use std::thread;

use easyhttp::config::PropertyResolver;
use easyhttp::http::{HeaderInterceptor, HttpRequest, RequestBody, RequestInterceptor};
use easyhttp::observability::correlation::CorrelationScope;
use easyhttp::{
    Arg, CompiledRoute, Error, HttpClient, InterfaceDescriptor, MethodDescriptor,
    ParamDescriptor, ReturnShape, Upload,
};
use serde::Deserialize;
use serde_json::json;

mod common;
use common::RecordingTransport;

fn users_api() -> InterfaceDescriptor {
    InterfaceDescriptor::new("users")
        .root("${users.root}")
        .produces("application/json")
        .method(
            MethodDescriptor::get("order", "/users/{id}/orders/{oid}")
                .param(ParamDescriptor::path("id"))
                .param(ParamDescriptor::path("oid")),
        )
        .method(MethodDescriptor::get("search", "/users").param(ParamDescriptor::query("filter")))
        .method(
            MethodDescriptor::post("create", "/users")
                .param(ParamDescriptor::body("user"))
                .returns(ReturnShape::object("user")),
        )
        .method(
            MethodDescriptor::post("avatar", "/users/{id}/avatar")
                .param(ParamDescriptor::path("id"))
                .param(ParamDescriptor::part("file"))
                .returns(ReturnShape::Unit),
        )
        .method(MethodDescriptor::new("describe").param(ParamDescriptor::query("q")))
}

fn build(transport: &RecordingTransport) -> HttpClient {
    HttpClient::builder(users_api())
        .resolver(PropertyResolver::default().without_env().with("users.root", "/api/"))
        .transport(transport.clone())
        .metrics(false)
        .build()
        .unwrap()
}

#[test]
fn test_not_remote_never_reaches_transport() {
    let transport = RecordingTransport::ok("{}");
    let client = build(&transport);

    assert_eq!(client.invoke("describe", &["x".into()]).unwrap(), None);
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_path_placeholders_resolve_fully() {
    let transport = RecordingTransport::ok("{}");
    let client = build(&transport);

    client.invoke("order", &[42.into(), 7.into()]).unwrap();
    assert_eq!(transport.last_request().url, "/api/users/42/orders/7");
}

#[test]
fn test_root_and_path_join_with_one_slash() {
    for (root, path) in [("/api/", "/v1/ping"), ("/api", "v1/ping"), ("/api", "/v1/ping")] {
        let transport = RecordingTransport::ok("");
        let client = HttpClient::builder(
            InterfaceDescriptor::new("ping")
                .root(root)
                .method(MethodDescriptor::get("ping", path)),
        )
        .transport(transport.clone())
        .build()
        .unwrap();

        client.invoke("ping", &[]).unwrap();
        assert_eq!(transport.last_request().url, "/api/v1/ping", "{root} + {path}");
    }
}

#[test]
fn test_map_query_argument_becomes_fields() {
    let transport = RecordingTransport::ok("[]");
    let client = build(&transport);

    let filter: BTreeMap<String, String> =
        [("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())].into();
    client.invoke("search", &[filter.into()]).unwrap();

    let request = transport.last_request();
    assert_eq!(
        request.query,
        vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
    );
    assert_eq!(request.body, RequestBody::None);
}

#[test]
fn test_null_body_is_sent_as_empty_object() {
    let transport = RecordingTransport::ok(r#"{"id":1}"#);
    let client = build(&transport);

    client.invoke("create", &[Arg::Null]).unwrap();
    let request = transport.last_request();
    assert_eq!(request.body, RequestBody::Structured("{}".to_string()));
    assert_eq!(request.header("content-type"), Some("application/json"));
    assert_eq!(request.header("accept"), Some("application/json"));
}

#[test]
fn test_concurrent_first_use_converges() {
    let transport = RecordingTransport::ok("{}");
    let client = build(&transport);
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                client.invoke("order", &[i.into(), 1.into()]).unwrap();
                client.route("order").unwrap()
            })
        })
        .collect();

    let routes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let canonical = client.templates().get("order").unwrap();
    assert!(routes.iter().all(|route| Arc::ptr_eq(route, &canonical)));
    assert_eq!(client.templates().len(), 1);
    assert_eq!(transport.calls(), 8);
}

#[test]
fn test_staged_upload_removed_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let transport = RecordingTransport::ok("");
    let client = HttpClient::builder(users_api())
        .resolver(PropertyResolver::default().without_env())
        .transport(transport.clone())
        .staging_dir(dir.path())
        .build()
        .unwrap();

    let upload = Upload::new("me.png", vec![0x89, b'P', b'N', b'G']).with_content_type("image/png");
    assert_eq!(client.invoke("avatar", &[7.into(), upload.into()]).unwrap(), None);

    let seen = transport.staged_seen();
    assert_eq!(seen.len(), 1, "staged file must exist while sending");
    assert!(seen[0].starts_with(dir.path()));
    assert!(!seen[0].exists());
    assert_eq!(common::count_files(dir.path()), 0);
}

#[test]
fn test_staged_upload_removed_after_transport_failure() {
    let dir = tempfile::tempdir().unwrap();
    let transport = RecordingTransport::failing();
    let client = HttpClient::builder(users_api())
        .resolver(PropertyResolver::default().without_env())
        .transport(transport.clone())
        .staging_dir(dir.path())
        .build()
        .unwrap();

    let err = client
        .invoke("avatar", &[7.into(), Upload::new("me.png", "x").into()])
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));

    let seen = transport.staged_seen();
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].exists());
    assert_eq!(common::count_files(dir.path()), 0);
}

#[test]
fn test_staged_upload_removed_after_decode_failure() {
    let dir = tempfile::tempdir().unwrap();
    let transport = RecordingTransport::ok("not json");
    let client = HttpClient::builder(
        InterfaceDescriptor::new("files").method(
            MethodDescriptor::post("upload", "/files")
                .param(ParamDescriptor::part("file"))
                .returns(ReturnShape::object("receipt")),
        ),
    )
    .transport(transport.clone())
    .staging_dir(dir.path())
    .build()
    .unwrap();

    let err = client
        .invoke("upload", &[Upload::new("a.txt", "x").into()])
        .unwrap_err();
    match err {
        Error::Decode { body, .. } => assert_eq!(body, "not json"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(common::count_files(dir.path()), 0);
}

#[test]
fn test_invalid_template_fails_every_call() {
    let transport = RecordingTransport::ok("{}");
    let client = HttpClient::builder(
        InterfaceDescriptor::new("broken").method(MethodDescriptor::get("get", "/items/{id")),
    )
    .transport(transport.clone())
    .build()
    .unwrap();

    for _ in 0..3 {
        assert!(matches!(client.invoke("get", &[]), Err(Error::Template { .. })));
    }
    assert!(matches!(
        client.templates().get("get").as_deref(),
        Some(CompiledRoute::Invalid(_))
    ));
    assert_eq!(transport.calls(), 0);
}

struct Stamp(i32, &'static str);

impl RequestInterceptor for Stamp {
    fn order(&self) -> i32 {
        self.0
    }

    fn before_send(&self, request: &mut HttpRequest) {
        let mut trail = request.header("x-trail").unwrap_or_default().to_string();
        trail.push_str(self.1);
        request
            .headers
            .insert("x-trail", trail.parse().unwrap());
    }
}

#[test]
fn test_interceptors_run_in_declared_order() {
    let transport = RecordingTransport::ok("{}");
    let client = HttpClient::builder(users_api())
        .resolver(PropertyResolver::default().without_env())
        .transport(transport.clone())
        .interceptor(Stamp(5, "c"))
        .interceptor(Stamp(-1, "a"))
        .interceptor(Stamp(0, "b"))
        .interceptor(HeaderInterceptor::new().header("x-api-key", "k").unwrap())
        .build()
        .unwrap();

    client.invoke("order", &[1.into(), 2.into()]).unwrap();
    let request = transport.last_request();
    assert_eq!(request.header("x-trail"), Some("abc"));
    assert_eq!(request.header("x-api-key"), Some("k"));
}

#[test]
fn test_correlation_id_is_propagated() {
    let transport = RecordingTransport::ok("{}");
    let client = HttpClient::builder(users_api())
        .resolver(PropertyResolver::default().without_env())
        .transport(transport.clone())
        .correlation_header("x-request-id")
        .build()
        .unwrap();

    client.invoke("order", &[1.into(), 2.into()]).unwrap();
    assert_eq!(transport.last_request().header("x-request-id"), None);

    {
        let _scope = CorrelationScope::enter("req-42");
        client.invoke("order", &[1.into(), 2.into()]).unwrap();
    }
    assert_eq!(transport.last_request().header("x-request-id"), Some("req-42"));
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: u64,
    name: String,
}

#[test]
fn test_typed_call() {
    let transport = RecordingTransport::ok(r#"{"id":1,"name":"ann"}"#);
    let client = build(&transport);

    let user: Option<User> = client.call("create", &[json!({"name": "ann"}).into()]).unwrap();
    assert_eq!(
        user,
        Some(User {
            id: 1,
            name: "ann".to_string()
        })
    );
    assert_eq!(
        transport.last_request().body,
        RequestBody::Structured(r#"{"name":"ann"}"#.to_string())
    );
}

#[test]
fn test_typed_call_mismatch_is_decode_error() {
    let transport = RecordingTransport::ok(r#"{"id":"not-a-number"}"#);
    let client = build(&transport);

    let err = client.call::<User>("create", &[Arg::Null]).unwrap_err();
    match err {
        Error::Decode { target, body, .. } => {
            assert!(target.ends_with("User"));
            assert!(body.contains("not-a-number"));
        }
        other => panic!("unexpected {other:?}"),
    }
}
