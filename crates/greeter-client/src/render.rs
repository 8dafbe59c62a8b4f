//! Console rendering of replies and error details.

use std::io::{self, Write};

use greeter_grpc::HelloReply;
use tonic::Status;
use tonic_types::{BadRequest, ErrorDetail, StatusExt};

/// Printed for any detail payload that is not a `BadRequest`.
pub const UNEXPECTED_ERROR: &str = "Unexpected error";

/// Print the banner line for a section.
pub fn banner(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out, "----------- {title} -----------")
}

/// Print the separator between parts of a section.
pub fn separator(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "- - - - - -")
}

/// Print one reply: the call-shape banner, the decoded message as a whole,
/// then each field on its own line.
pub fn render_reply(out: &mut impl Write, reply: &HelloReply, shape: &str) -> io::Result<()> {
    banner(out, shape)?;
    writeln!(out, "response")?;
    writeln!(out, "{reply:?}")?;
    separator(out)?;
    writeln!(out, "fields")?;
    writeln!(out, "message: {}", reply.message)?;
    writeln!(out, "is_welcome: {}", reply.is_welcome)
}

/// Print every field violation of a `BadRequest` detail.
pub fn render_bad_request(out: &mut impl Write, bad_request: &BadRequest) -> io::Result<()> {
    for violation in &bad_request.field_violations {
        writeln!(out, "field_violations {{")?;
        writeln!(out, "  field: {:?}", violation.field)?;
        writeln!(out, "  description: {:?}", violation.description)?;
        writeln!(out, "}}")?;
    }
    Ok(())
}

/// Decode the typed details of `status` and print the recognized ones.
///
/// A `BadRequest` is printed violation by violation. Any other detail type,
/// an envelope without details, or one that fails to decode prints
/// [`UNEXPECTED_ERROR`].
pub fn render_status_details(out: &mut impl Write, status: &Status) -> io::Result<()> {
    let details = match status.check_error_details_vec() {
        Ok(details) if !details.is_empty() => details,
        Ok(_) => return writeln!(out, "{UNEXPECTED_ERROR}"),
        Err(e) => {
            tracing::debug!("Failed to decode error details: {}", e);
            return writeln!(out, "{UNEXPECTED_ERROR}");
        }
    };

    for detail in details {
        match detail {
            ErrorDetail::BadRequest(bad_request) => render_bad_request(out, &bad_request)?,
            other => {
                tracing::debug!(?other, "Unrecognized error detail");
                writeln!(out, "{UNEXPECTED_ERROR}")?;
            }
        }
    }
    Ok(())
}
