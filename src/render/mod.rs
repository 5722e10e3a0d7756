pub(crate) mod clipper;
/// The session-oriented rendering API.
pub mod session;
pub(crate) mod subtitle;
pub(crate) mod word;
