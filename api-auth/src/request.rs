//! The minimal view of a request that authentication needs.

use cookie::Cookie;
use http::{header::COOKIE, request::Parts, HeaderMap, Request};

/// Header and cookie lookup by name.
///
/// Implemented for [`http::Request`] and [`http::request::Parts`]; nothing
/// else about a request is consulted.
pub trait AuthRequest {
    /// Returns the value of the named header, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Returns the value of the named cookie, if present.
    fn cookie(&self, name: &str) -> Option<String>;
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}

impl<B> AuthRequest for Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        header(self.headers(), name)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        cookie(self.headers(), name)
    }
}

impl AuthRequest for Parts {
    fn header(&self, name: &str) -> Option<&str> {
        header(&self.headers, name)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        cookie(&self.headers, name)
    }
}
