//! A typed facade over a declared interface.
//!
//! Each remote method becomes an ordinary Rust method that forwards its
//! arguments positionally. Run against any JSONPlaceholder-style service:
//!
//! ```text
//! cargo run --example user_api -- https://jsonplaceholder.typicode.com
//! ```

use easyhttp::observability::correlation::{self, CorrelationScope};
use easyhttp::observability::logging::init_logging;
use easyhttp::{
    HttpClient, InterfaceDescriptor, MethodDescriptor, ParamDescriptor, ReturnShape,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Post {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<u64>,
    #[serde(rename = "userId")]
    user_id: u64,
    title: String,
    body: String,
}

struct UserApi {
    client: HttpClient,
}

impl UserApi {
    fn descriptor() -> InterfaceDescriptor {
        InterfaceDescriptor::new("users")
            .root("${API_ROOT:/}")
            .produces("application/json")
            .method(
                MethodDescriptor::get("user", "/users/{id}")
                    .param(ParamDescriptor::path("id"))
                    .returns(ReturnShape::object("User")),
            )
            .method(
                MethodDescriptor::get("posts", "/posts")
                    .param(ParamDescriptor::query("user").named("userId"))
                    .returns(ReturnShape::array("[Post]")),
            )
            .method(
                MethodDescriptor::post("publish", "/posts")
                    .param(ParamDescriptor::body("post"))
                    .returns(ReturnShape::object("Post")),
            )
            .method(
                MethodDescriptor::delete("remove", "/posts/{id}")
                    .param(ParamDescriptor::path("id"))
                    .returns(ReturnShape::Unit),
            )
            .method(
                MethodDescriptor::new("headline")
                    .param(ParamDescriptor::new("id"))
                    .with_default(|client, args| {
                        let user = client.invoke("user", args)?;
                        let name = user
                            .as_ref()
                            .and_then(|u| u.get("name"))
                            .and_then(Value::as_str)
                            .unwrap_or("unknown");
                        Ok(Some(Value::String(format!("Posts by {name}"))))
                    }),
            )
    }

    fn new(base_url: &str) -> easyhttp::Result<Self> {
        let transport = easyhttp::http::ReqwestTransport::new()?.base_url(base_url)?;
        let client = HttpClient::builder(Self::descriptor())
            .transport(transport)
            .eager_compile(true)
            .build()?;
        Ok(Self { client })
    }

    fn user(&self, id: u64) -> easyhttp::Result<Option<User>> {
        self.client.call("user", &[id.into()])
    }

    fn posts(&self, user_id: u64) -> easyhttp::Result<Vec<Post>> {
        Ok(self.client.call("posts", &[user_id.into()])?.unwrap_or_default())
    }

    fn publish(&self, post: &Post) -> easyhttp::Result<Option<Post>> {
        let post = easyhttp::Arg::json(post)
            .map_err(|e| easyhttp::Error::InvalidArgument(e.to_string()))?;
        self.client.call("publish", &[post])
    }

    fn remove(&self, id: u64) -> easyhttp::Result<()> {
        self.client.invoke("remove", &[id.into()]).map(|_| ())
    }

    fn headline(&self, id: u64) -> easyhttp::Result<Option<String>> {
        self.client.call("headline", &[id.into()])
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("debug");
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://jsonplaceholder.typicode.com".to_string());

    let api = UserApi::new(&base_url)?;
    println!("{}", api.client);

    let _scope = CorrelationScope::enter(correlation::generate());

    if let Some(user) = api.user(1)? {
        println!("user #{}: {} <{}>", user.id, user.name, user.email);
    }
    println!("{}", api.headline(1)?.unwrap_or_default());
    for post in api.posts(1)?.iter().take(3) {
        println!("  - {}", post.title);
    }

    let created = api.publish(&Post {
        id: None,
        user_id: 1,
        title: "hello".to_string(),
        body: "from easyhttp".to_string(),
    })?;
    println!("created: {created:?}");
    api.remove(1)?;

    Ok(())
}
