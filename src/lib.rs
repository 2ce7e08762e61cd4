//! # Sirena - a client for Siren hypermedia APIs
//!
//! Sirena turns a [Siren](https://github.com/kevinswiber/siren) response
//! into a live object graph. An entity's properties become data fields, its
//! actions and link relations become callable members, and invoking a
//! member performs the described HTTP request and materializes the next
//! response the same way. One bootstrap GET is enough to navigate an entire
//! API by following what the server advertises.
//!
//! ## Quick start
//!
//! ```no_run
//! use serde_json::json;
//! use sirena::{Args, SirenClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sirena::Error> {
//!     let client = SirenClient::builder().build()?;
//!
//!     // One GET to the root; everything else hangs off the result.
//!     let root = client
//!         .connect("https://api.example.com/")
//!         .await?
//!         .expect("root resource exists");
//!
//!     println!("connected to a {}", root.classname());
//!
//!     // Properties are data fields.
//!     if let Some(version) = root.field("version") {
//!         println!("api version {version}");
//!     }
//!
//!     // Actions and link relations are callable members. Arguments fill
//!     // the href's template variables first; the rest become the query
//!     // or body, depending on the action's verb.
//!     let mut args = Args::new();
//!     args.insert("id".to_owned(), json!(42));
//!     if let Some(order) = root.invoke("get_order", &args).await? {
//!         println!("order status: {:?}", order.field("status"));
//!     }
//!
//!     // Link relations take no arguments.
//!     if let Some(next) = root.invoke("next", &Args::new()).await? {
//!         println!("next page is a {}", next.classname());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## How a response becomes an object
//!
//! Every response runs the same pipeline: [`classify`] decides whether the
//! status/body pair is absent, usable, or a failure; [`SirenBuilder`]
//! decodes the body into an [`Entity`] graph, disambiguating each child as
//! an embedded link or a nested entity; and [`materialize`] turns one
//! entity into a [`MaterializedObject`] with a member dispatch table. The
//! actual wire work lives behind the [`transport::Transport`] trait, so
//! alternative transports plug in without touching any of this.
//!
//! ## Absence vs. failure
//!
//! A 404 is not an error. It flows through the crate as `Ok(None)`, from
//! [`SirenClient::connect`] down to every generated member, keeping
//! "legitimately does not exist" distinct from the failure taxonomy in
//! [`Error`].

mod builder;
mod client;
mod error;
mod materialize;
pub mod response;
mod siren;
pub mod template;
pub mod transport;

pub use builder::SirenBuilder;
pub use client::{SirenClient, SirenClientBuilder};
pub use error::{Error, Result};
pub use materialize::{materialize, normalize_member_name, Args, Child, MaterializedObject};
pub use response::{classify, ClassifiedBody};
pub use siren::{Action, ActionField, Entity, Link, SubEntity};
pub use template::TemplatedUri;
pub use transport::{ReqwestTransport, SirenConfig, Transport, TransportRequest, TransportResponse};
