//! Error types for siren interpretation and traversal.
//!
//! Every failure the crate can produce is a variant of [`Error`], carrying
//! enough context (status codes, offending names, underlying parse causes)
//! for callers and tests to make precise assertions. Absence is not a
//! failure: a 404 flows through the crate as `Ok(None)`, never as an error.

use http::StatusCode;

/// The error type for every fallible operation in this crate.
///
/// # Examples
///
/// ```no_run
/// use sirena::{Error, SirenClient};
///
/// # async fn example() -> Result<(), Error> {
/// let client = SirenClient::builder().build()?;
///
/// match client.connect("http://localhost:8080/").await {
///     Ok(Some(root)) => println!("connected to a {}", root.classname()),
///     Ok(None) => println!("root resource does not exist"),
///     Err(Error::Connect { url, .. }) => eprintln!("could not reach {url}"),
///     Err(Error::MalformedSiren { message, .. }) => eprintln!("bad siren: {message}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The bootstrap request could not reach the server at all.
    ///
    /// Connection refused, DNS failure, TLS handshake failure. Raised only
    /// by [`SirenClient::connect`](crate::SirenClient::connect); requests
    /// performed by generated members report [`Error::Network`] instead.
    #[error("unable to connect to {url}")]
    Connect {
        /// The root url the client was pointed at.
        url: String,
        /// The underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// A network-level failure while performing a generated member's request.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a status outside 200-299, other than 404.
    #[error("received an unexpected status code of {status}; unable to construct siren objects")]
    UnexpectedStatus {
        /// The offending status code.
        status: StatusCode,
    },

    /// The response status was in range but its body was unusable.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// What made the body unusable.
        reason: String,
    },

    /// The body was not valid siren: bad JSON, or a required field missing
    /// somewhere in the document.
    ///
    /// The graph builder never returns a partial tree; any failure during
    /// recursive construction is rewrapped into this variant with the
    /// underlying cause preserved.
    #[error("malformed siren document: {message}")]
    MalformedSiren {
        /// What stage of decoding gave up.
        message: String,
        /// The underlying parse or validation failure.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The decoded value handed to the builder was not a JSON object.
    #[error("siren construction requires a JSON object, got {found}")]
    ExpectedObject {
        /// The JSON type that was found instead.
        found: &'static str,
    },

    /// A descriptor constructor invariant was broken, such as an entity
    /// with no classnames or a link with an empty `rel`.
    #[error("{0}")]
    Validation(String),

    /// An action was invoked without a value for every URI template
    /// variable in its href.
    ///
    /// This is a caller error, raised before any network traffic occurs.
    #[error("unbound template variables in url: {}", .names.join(", "))]
    UnboundTemplateVariables {
        /// The variables still missing after binding.
        names: Vec<String>,
    },

    /// An action name or link relation cannot be normalized into a member
    /// identifier.
    #[error("unable to create member name from {raw:?} (attempted {attempted:?})")]
    InvalidMemberName {
        /// The name as it appeared in the document.
        raw: String,
        /// What normalization produced before giving up.
        attempted: String,
    },

    /// `invoke` was called with a name the object does not expose.
    #[error("object of class {classname:?} has no member named {name:?}")]
    UnknownMember {
        /// The requested member name.
        name: String,
        /// The classname of the object that was asked.
        classname: String,
    },

    /// The root url could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the offending HTTP status code, if this error carries one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for failures raised by the transport layer rather
    /// than by siren interpretation.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Connect { .. } | Error::Network(_))
    }
}

/// A specialized `Result` type for siren operations.
pub type Result<T> = std::result::Result<T, Error>;
