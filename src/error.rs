use std::env;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

pub const ERROR_TITLE: &str = "Error";

impl Error {
    /// Errors with codes below 100 come from the plumbing, not from the user's actions.
    pub fn is_internal(&self) -> bool {
        (1..=99).contains(&self.code)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: 101,
        message: "invalid input".into(),
    }
}

pub fn geocoding_failed_error() -> Error {
    Error {
        code: 110,
        message: "Server is not available".into(),
    }
}

pub fn directions_failed_error<T: Display>(cause: T) -> Error {
    Error {
        code: 111,
        message: format!("directions request failed: {}", cause),
    }
}

pub fn directions_unavailable_error() -> Error {
    Error {
        code: 112,
        message: "Route is not available".into(),
    }
}

pub fn insufficient_waypoints_error() -> Error {
    Error {
        code: 113,
        message: "Not enough addresses to build a route".into(),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: 1,
        message: "environment variable error".into(),
    }
}

pub fn reqwest_error(_: reqwest::Error) -> Error {
    Error {
        code: 3,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: 4,
        message: "upstream error".into(),
    }
}

pub fn no_runtime_error() -> Error {
    Error {
        code: 6,
        message: "no async runtime to run service requests on".into(),
    }
}

pub fn unexpected_error() -> Error {
    Error {
        code: 5,
        message: "unexpected error".into(),
    }
}

#[test]
fn user_facing_messages() {
    assert_eq!(geocoding_failed_error().message, "Server is not available");
    assert_eq!(directions_unavailable_error().message, "Route is not available");
    assert!(!insufficient_waypoints_error().is_internal());
    assert!(upstream_error().is_internal());
}
