use chrono::{DateTime, Utc};
use tracing::info;

use mailcamp_domain::mailing::MailingStatus;

use crate::domain::repository::MailingStatusWriter;
use crate::domain::types::Mailing;
use crate::error::MailingsServiceError;

/// Re-evaluate `mailing` at `now` and persist the result if it changed.
///
/// Calling this repeatedly with the same `now` writes at most once.
pub async fn refresh_status<W: MailingStatusWriter>(
    writer: &W,
    mailing: &mut Mailing,
    now: DateTime<Utc>,
) -> Result<MailingStatus, MailingsServiceError> {
    let evaluated = mailing.schedule().status_at(now);
    if evaluated != mailing.status {
        writer.set_status(mailing.id, evaluated).await?;
        info!(
            mailing_id = %mailing.id,
            from = %mailing.status,
            to = %evaluated,
            "mailing status changed"
        );
        mailing.status = evaluated;
    }
    Ok(evaluated)
}
