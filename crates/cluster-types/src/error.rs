use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{self as aweb, HttpResponseBuilder};
use convert_case::Casing;
use serde::{Deserialize, Serialize};

/// Error surfaced to a `user_listener` or, at the HTTP boundary, serialized as JSON.
///
/// Mirrors the split the rest of the stack uses between a Rust-idiomatic [`Error`] (carrying
/// the data needed to reconstruct a message) and a stable, wire-facing [`Code`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Index `{0}` already exists.")]
    IndexAlreadyExists(String),
    #[error("Index `{0}` not found.")]
    IndexNotFound(String),
    #[error("{index_uid} is not a valid index uid: {reason}")]
    InvalidIndexName { index_uid: String, reason: NameErrorReason },
    #[error("`{index_uid}` collides with an existing alias of the same name.")]
    CollidesWithAlias { index_uid: String },
    #[error("Index `{index_uid}`: the mapping for type `{type_name}` could not be parsed: {cause}")]
    MapperParsing { index_uid: String, type_name: String, cause: String },
    #[error("Could not create the local storage for index `{index_uid}`: {0}", .source)]
    DirectoryCreationFailed { index_uid: String, source: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// The reason a candidate index name was rejected by the name validator (§4.2).
///
/// Variant order matches the validator's fixed check order so that `Display` output is
/// deterministic for a given input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameErrorReason {
    WhitespaceForbidden,
    CommaForbidden,
    HashForbidden,
    LeadingUnderscoreForbidden,
    MustBeLowercase,
    IllegalFilesystemChar,
}

impl fmt::Display for NameErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameErrorReason::WhitespaceForbidden => write!(f, "must not contain whitespace"),
            NameErrorReason::CommaForbidden => write!(f, "must not contain a comma"),
            NameErrorReason::HashForbidden => write!(f, "must not contain `#`"),
            NameErrorReason::LeadingUnderscoreForbidden => {
                write!(f, "must not start with `_`")
            }
            NameErrorReason::MustBeLowercase => write!(f, "must be lowercase"),
            NameErrorReason::IllegalFilesystemChar => {
                write!(f, "must not contain any of `\\ / * ? \" < > | :`")
            }
        }
    }
}

impl Error {
    pub fn index_uid(&self) -> Option<&str> {
        match self {
            Error::IndexAlreadyExists(uid) => Some(uid),
            Error::IndexNotFound(uid) => Some(uid),
            Error::InvalidIndexName { index_uid, .. } => Some(index_uid),
            Error::CollidesWithAlias { index_uid } => Some(index_uid),
            Error::MapperParsing { index_uid, .. } => Some(index_uid),
            Error::DirectoryCreationFailed { index_uid, .. } => Some(index_uid),
            Error::Io(_) | Error::Anyhow(_) => None,
        }
    }
}

/// Maps an [`Error`] (or any other error type) to a stable, wire-facing [`Code`].
pub trait ErrorCode {
    fn error_code(&self) -> Code;

    fn http_status(&self) -> StatusCode {
        self.error_code().http()
    }

    fn error_name(&self) -> String {
        self.error_code().name()
    }

    fn error_type(&self) -> String {
        self.error_code().type_()
    }
}

impl ErrorCode for Error {
    fn error_code(&self) -> Code {
        match self {
            Error::IndexAlreadyExists(_) => Code::IndexAlreadyExists,
            Error::IndexNotFound(_) => Code::IndexNotFound,
            Error::InvalidIndexName { .. } => Code::InvalidIndexUid,
            Error::CollidesWithAlias { .. } => Code::InvalidIndexUid,
            Error::MapperParsing { .. } => Code::IndexCreationFailed,
            Error::DirectoryCreationFailed { .. } => Code::IndexCreationFailed,
            Error::Io(_) => Code::Internal,
            Error::Anyhow(_) => Code::Internal,
        }
    }
}

#[allow(clippy::enum_variant_names)]
pub enum ErrorType {
    Internal,
    InvalidRequest,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorType::Internal => write!(f, "internal"),
            ErrorType::InvalidRequest => write!(f, "invalid_request"),
        }
    }
}

/// Implement the error codes used by this crate.
///
/// Mirrors the reference stack's `make_error_codes!` macro: builds a `Code` enum together
/// with its `http`/`name`/`type_` accessors in one place so the list of codes stays a flat,
/// greppable table.
macro_rules! make_error_codes {
    ($($code_ident:ident, $err_type:ident, $status:ident);* $(;)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Code {
            $($code_ident),*
        }

        impl Code {
            pub fn http(&self) -> StatusCode {
                match self {
                    $(Code::$code_ident => StatusCode::$status),*
                }
            }

            fn name(&self) -> String {
                match self {
                    $(Code::$code_ident => stringify!($code_ident).to_case(convert_case::Case::Snake)),*
                }
            }

            fn type_(&self) -> String {
                match self {
                    $(Code::$code_ident => ErrorType::$err_type.to_string()),*
                }
            }
        }
    };
}

make_error_codes! {
    IndexAlreadyExists  , InvalidRequest , CONFLICT;
    IndexNotFound       , InvalidRequest , NOT_FOUND;
    InvalidIndexUid     , InvalidRequest , BAD_REQUEST;
    IndexCreationFailed , Internal       , INTERNAL_SERVER_ERROR;
    Internal            , Internal       , INTERNAL_SERVER_ERROR;
}

/// The JSON body returned for any failed request, translated from an [`ErrorCode`]-bearing error.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseError {
    #[serde(skip)]
    pub status: u16,
    pub message: String,
    #[serde(rename = "code")]
    error_code: String,
    #[serde(rename = "type")]
    error_type: String,
}

impl ResponseError {
    pub fn from_msg(message: String, code: Code) -> Self {
        Self {
            status: code.http().as_u16(),
            message,
            error_code: code.name(),
            error_type: code.type_(),
        }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl std::error::Error for ResponseError {}

impl<T> From<T> for ResponseError
where
    T: std::error::Error + ErrorCode,
{
    fn from(other: T) -> Self {
        Self::from_msg(other.to_string(), other.error_code())
    }
}

impl aweb::error::ResponseError for ResponseError {
    fn error_response(&self) -> aweb::HttpResponse {
        let json = serde_json::to_vec(self).unwrap();
        HttpResponseBuilder::new(self.status_code()).content_type("application/json").body(json)
    }

    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
