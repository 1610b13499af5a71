//! Application submission intake: multipart parsing, field validation, CV
//! gating, and persistence to the applicant store.

pub mod form;
pub mod handlers;
pub mod storage;
