//! Job seeker resume upload.

use std::io::{self, Write};
use std::path::Path;

use talent_client::ClientError;
use talent_models::{ResumeFile, UserType};
use talent_session::SessionStore;
use tracing::warn;

use crate::notify::{messages, Notice};
use crate::views::{require_role, Outcome};

pub async fn upload_resume<W: Write>(
    store: &SessionStore,
    path: &Path,
    out: &mut W,
) -> io::Result<Outcome> {
    if let Some(outcome) = require_role(&store.session(), UserType::User, out)? {
        return Ok(outcome);
    }

    let resume = match ResumeFile::new(path) {
        Ok(resume) => resume,
        Err(e) => {
            Notice::error("Invalid file format", e.to_string()).write_to(out)?;
            return Ok(Outcome::Failed);
        }
    };

    match store.client().upload_resume(&resume).await {
        Ok(_) => {
            Notice::success("Resume uploaded", messages::RESUME_UPLOADED).write_to(out)?;
            Ok(Outcome::Done)
        }
        Err(ClientError::Io(e)) => {
            warn!(error = %e, path = %path.display(), "Could not read resume");
            Notice::error("Upload failed", messages::RESUME_UNREADABLE).write_to(out)?;
            Ok(Outcome::Failed)
        }
        Err(e) => {
            warn!(error = %e, "Resume upload failed");
            Notice::error("Upload failed", messages::RESUME_UPLOAD_FAILED).write_to(out)?;
            Ok(Outcome::Failed)
        }
    }
}
