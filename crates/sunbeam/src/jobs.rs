//! Blocking work executed on worker threads.

use sunbeam_protocol::decode_command;

use crate::page::{Job, JobOutcome};
use crate::system;

/// Runs `job` to completion. Debounce jobs are timers and complete at once.
pub fn execute(job: Job) -> JobOutcome {
    match job {
        Job::RunCommand {
            extension,
            command,
            params,
            query,
        } => {
            let result = extension.run(&command, &params, query.as_deref());
            if let Err(error) = &result {
                tracing::warn!(extension = %extension.alias, %command, %error, "command failed");
            }
            JobOutcome::Command { query, result }
        }
        Job::Silent {
            extension,
            command,
            params,
            followup,
        } => {
            let result = extension
                .run(&command, &params, None)
                .map_err(|error| error.to_string())
                .and_then(|output| {
                    if output.iter().all(u8::is_ascii_whitespace) {
                        return Ok(None);
                    }
                    decode_command(extension.client().validator(), &output)
                        .map(Some)
                        .map_err(|error| error.to_string())
                });
            JobOutcome::Silent { result, followup }
        }
        Job::Copy { text, followup } => JobOutcome::Done {
            result: system::copy_to_clipboard(&text),
            followup,
        },
        Job::Open {
            target,
            app,
            followup,
        } => JobOutcome::Done {
            result: system::open_target(&target, app.as_ref()),
            followup,
        },
        Job::Debounce { query, .. } => JobOutcome::Debounce { query },
    }
}
