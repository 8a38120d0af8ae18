//! HTTP request handlers.
//!
//! Each handler validates its input, calls the injected storage and record store from
//! [`crate::AppState`], and returns either a JSON body or a [`crate::errors::Error`].

pub mod texts;
