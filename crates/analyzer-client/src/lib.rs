//! Analyzer Client - async access to the report API
//!
//! [`ReportClient`] wraps the backend endpoints, [`filename_from_disposition`]
//! names downloaded files and [`RequestSequencer`] keeps overlapping fetches
//! from overwriting newer results.

pub mod client;
pub mod disposition;
pub mod error;
pub mod sequencer;

pub use client::{DownloadedReport, ReportClient};
pub use disposition::filename_from_disposition;
pub use error::ClientError;
pub use sequencer::{RequestSequencer, RequestTicket};
