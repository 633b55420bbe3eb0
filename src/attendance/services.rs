use tracing::{info, warn};

use crate::{
    attendance::{
        dto::ScanRequest,
        ledger::{LedgerEntry, Participant},
    },
    error::{AppError, StoreError},
    state::AppState,
};

pub async fn scan(state: &AppState, req: ScanRequest) -> Result<LedgerEntry, AppError> {
    // Trimmed the same way the event catalog stores titles.
    let event_title = req.event_title.trim().to_string();
    if event_title.is_empty() {
        return Err(AppError::Validation("eventTitle is required".into()));
    }
    let student_id = req.student_id.trim().to_string();
    if student_id.is_empty() {
        return Err(AppError::Validation("studentId is required".into()));
    }

    let participant = Participant {
        name: req.name.trim().to_string(),
        course: req.course.trim().to_string(),
        gender: req.gender.trim().to_string(),
        student_id,
        year: req.year.trim().to_string(),
        time: req.time,
    };

    match state.ledger.scan(&event_title, participant.clone()).await {
        Ok(entry) => {
            info!(
                title = %event_title,
                student_id = %participant.student_id,
                participants = entry.participants.len(),
                "participant scanned"
            );
            Ok(entry)
        }
        Err(StoreError::AlreadyScanned) => {
            warn!(title = %event_title, student_id = %participant.student_id, "duplicate scan");
            Err(AppError::AlreadyScanned)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn get_by_title(state: &AppState, event_title: &str) -> Result<LedgerEntry, AppError> {
    state
        .ledger
        .find_by_title(event_title.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

pub async fn list_all(state: &AppState) -> Result<Vec<LedgerEntry>, AppError> {
    let entries = state.ledger.list().await?;
    if entries.is_empty() {
        return Err(AppError::NotFound("No events found".into()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_req(title: &str, student_id: &str, name: &str) -> ScanRequest {
        ScanRequest {
            event_title: title.into(),
            name: name.into(),
            course: "BSCS".into(),
            gender: "male".into(),
            student_id: student_id.into(),
            year: "3".into(),
            time: "2024-08-20T08:01:00Z".into(),
        }
    }

    #[tokio::test]
    async fn first_scan_creates_ledger_with_one_participant() {
        let state = AppState::fake();
        let entry = scan(&state, scan_req("Orientation", "S1", "A")).await.unwrap();
        assert_eq!(entry.event_title, "Orientation");
        assert_eq!(entry.participants.len(), 1);

        let all = list_all(&state).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].participants.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_scan_leaves_ledger_unchanged() {
        let state = AppState::fake();
        scan(&state, scan_req("Orientation", "S1", "A")).await.unwrap();
        let err = scan(&state, scan_req("Orientation", "S1", "A-dup")).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyScanned));

        let entry = get_by_title(&state, "Orientation").await.unwrap();
        assert_eq!(entry.participants.len(), 1);
        assert_eq!(entry.participants[0].name, "A");
    }

    #[tokio::test]
    async fn same_student_may_attend_different_events() {
        let state = AppState::fake();
        scan(&state, scan_req("Orientation", "S1", "A")).await.unwrap();
        scan(&state, scan_req("Foundation Day", "S1", "A")).await.unwrap();
        let second = scan(&state, scan_req("Orientation", "S2", "B")).await.unwrap();

        assert_eq!(second.participants.len(), 2);
        assert_eq!(list_all(&state).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn padded_titles_land_in_the_catalog_title_ledger() {
        let state = AppState::fake();
        scan(&state, scan_req("Orientation", "S1", "A")).await.unwrap();
        let entry = scan(&state, scan_req("  Orientation ", "S2", "B")).await.unwrap();

        assert_eq!(entry.event_title, "Orientation");
        assert_eq!(entry.participants.len(), 2);
        assert_eq!(list_all(&state).await.unwrap().len(), 1);
        assert!(get_by_title(&state, "Orientation ").await.is_ok());
    }

    #[tokio::test]
    async fn gender_is_recorded() {
        let state = AppState::fake();
        let entry = scan(&state, scan_req("Orientation", "S1", "A")).await.unwrap();
        assert_eq!(entry.participants[0].gender, "male");
    }

    #[tokio::test]
    async fn concurrent_duplicate_scans_admit_exactly_one() {
        let state = AppState::fake();
        let attempts = (0..8).map(|i| {
            let state = state.clone();
            tokio::spawn(async move {
                scan(&state, scan_req("Orientation", "S1", &format!("A{i}"))).await
            })
        });

        let mut ok = 0;
        for handle in attempts.collect::<Vec<_>>() {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        let entry = get_by_title(&state, "Orientation").await.unwrap();
        assert_eq!(entry.participants.len(), 1);
    }

    #[tokio::test]
    async fn lookups_report_not_found() {
        let state = AppState::fake();
        assert!(matches!(
            get_by_title(&state, "Nope").await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            list_all(&state).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn blank_student_id_is_rejected() {
        let state = AppState::fake();
        let err = scan(&state, scan_req("Orientation", "  ", "A")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
