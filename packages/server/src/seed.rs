use sea_orm::*;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{contest, contest_participant};

/// Create secondary indexes that entity schema sync does not derive.
///
/// Failures are logged and ignored; the indexes only speed up lookups.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // contest-stats: participations by email
    let participant_email = Index::create()
        .if_not_exists()
        .name("idx_contest_participant_email")
        .table(contest_participant::Entity)
        .col(contest_participant::Column::UserEmail)
        .to_string(PostgresQueryBuilder);

    // contest-stats: wins by email
    let winner_email = Index::create()
        .if_not_exists()
        .name("idx_contest_winner_email")
        .table(contest::Entity)
        .col(contest::Column::WinnerEmail)
        .to_string(PostgresQueryBuilder);

    // GET /contest?status=
    let status_created = Index::create()
        .if_not_exists()
        .name("idx_contest_status_created")
        .table(contest::Entity)
        .col(contest::Column::Status)
        .col(contest::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_contest_participant_email", participant_email),
        ("idx_contest_winner_email", winner_email),
        ("idx_contest_status_created", status_created),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
