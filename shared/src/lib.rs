// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

//! Decoders, log formatting and error codes shared by the SSPI monitor and
//! anything that needs to read its output or status codes.

pub mod decode;
pub mod error;
pub mod logging;

pub use error::{DiagError, LibraryKind, Result};
pub use logging::LogLevel;
