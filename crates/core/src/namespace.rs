//! Namespace resolution and path rendering
//!
//! Every splunkd resource lives in a namespace given by an owner and an app,
//! governed by a sharing mode:
//!
//! | sharing  | owner     | app      |
//! |----------|-----------|----------|
//! | `user`   | {owner}   | {app}    |
//! | `app`    | `nobody`  | {app}    |
//! | `global` | `nobody`  | {app}    |
//! | `system` | `nobody`  | `system` |
//!
//! `-` is the wildcard for owner or app and needs no special handling here.
//! With neither owner nor app, paths go to the `/services` branch, which is
//! the current user's default namespace.

use std::fmt;
use std::str::FromStr;

use crate::encoding::UrlEncoded;
use crate::error::{Error, Result};

/// The user that owns shared resources
pub const NOBODY: &str = "nobody";

/// The app that owns system resources
pub const SYSTEM_APP: &str = "system";

/// Sharing mode of a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sharing {
    User,
    App,
    Global,
    System,
}

impl Sharing {
    pub const fn as_str(self) -> &'static str {
        match self {
            Sharing::User => "user",
            Sharing::App => "app",
            Sharing::Global => "global",
            Sharing::System => "system",
        }
    }
}

impl fmt::Display for Sharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sharing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(Sharing::User),
            "app" => Ok(Sharing::App),
            "global" => Ok(Sharing::Global),
            "system" => Ok(Sharing::System),
            _ => Err(Error::InvalidArgument(format!(
                "invalid value for 'sharing': {s}"
            ))),
        }
    }
}

/// A reconciled (sharing, owner, app) triple
///
/// Only [`Namespace::resolve`] and [`Namespace::from_parts`] build one, so a
/// `Namespace` always satisfies the sharing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    sharing: Option<Sharing>,
    owner: Option<String>,
    app: Option<String>,
}

impl Namespace {
    /// Reconcile a sharing mode given as text with an owner and app.
    pub fn resolve(sharing: Option<&str>, owner: Option<&str>, app: Option<&str>) -> Result<Self> {
        let sharing = sharing.map(str::parse::<Sharing>).transpose()?;
        Ok(Self::from_parts(sharing, owner, app))
    }

    /// Reconcile an already-parsed sharing mode with an owner and app.
    pub fn from_parts(sharing: Option<Sharing>, owner: Option<&str>, app: Option<&str>) -> Self {
        let (owner, app) = match sharing {
            Some(Sharing::System) => (Some(NOBODY), Some(SYSTEM_APP)),
            Some(Sharing::Global) | Some(Sharing::App) => (Some(NOBODY), app),
            Some(Sharing::User) | None => (owner, app),
        };
        Self {
            sharing,
            owner: owner.map(str::to_string),
            app: app.map(str::to_string),
        }
    }

    /// Namespace of a specific user and app
    pub fn user(owner: &str, app: &str) -> Self {
        Self::from_parts(Some(Sharing::User), Some(owner), Some(app))
    }

    pub fn sharing(&self) -> Option<Sharing> {
        self.sharing
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn app(&self) -> Option<&str> {
        self.app.as_deref()
    }

    /// True when nothing was specified at all
    pub fn is_unset(&self) -> bool {
        self.sharing.is_none() && self.owner.is_none() && self.app.is_none()
    }
}

/// A path segment handed to the request methods
///
/// Plain text is encoded on its way into the URL; a `UrlEncoded` segment is
/// used as-is.
#[derive(Debug, Clone, Copy)]
pub enum Segment<'a> {
    Raw(&'a str),
    Encoded(&'a UrlEncoded),
}

impl Segment<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Segment::Raw(s) => *s,
            Segment::Encoded(e) => e.as_str(),
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.as_str().starts_with('/')
    }

    fn encoded(&self) -> UrlEncoded {
        match self {
            Segment::Raw(s) => UrlEncoded::new(s),
            Segment::Encoded(e) => UrlEncoded::from(*e),
        }
    }
}

impl<'a> From<&'a str> for Segment<'a> {
    fn from(s: &'a str) -> Self {
        Segment::Raw(s)
    }
}

impl<'a> From<&'a String> for Segment<'a> {
    fn from(s: &'a String) -> Self {
        Segment::Raw(s)
    }
}

impl<'a> From<&'a UrlEncoded> for Segment<'a> {
    fn from(e: &'a UrlEncoded) -> Self {
        Segment::Encoded(e)
    }
}

/// Qualify `segment` into an absolute REST path within `namespace`.
///
/// Absolute segments are returned (encoded) without looking at the
/// namespace.
pub fn render_path(segment: Segment<'_>, namespace: &Namespace) -> UrlEncoded {
    if segment.is_absolute() {
        return segment.encoded();
    }

    let prefix = match (namespace.owner(), namespace.app()) {
        (None, None) => UrlEncoded::skip_encode("/services/"),
        (owner, app) => {
            let owner = owner.unwrap_or(NOBODY);
            let app = app.unwrap_or(SYSTEM_APP);
            UrlEncoded::skip_encode("/servicesNS/") + owner + "/" + app + "/"
        }
    };

    prefix + segment.encoded()
}
