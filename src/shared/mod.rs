pub mod error;
pub mod msbuild_string;
pub mod paths;
pub mod result;
pub mod security;

pub use result::Result;
